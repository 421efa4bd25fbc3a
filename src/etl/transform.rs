//! Transformer trait for data transformation

use eyre::Result;

/// Transformer trait for transforming data
///
/// Implementors define how to transform input:
/// - Data cleaning (dropping invalid rows)
/// - Type coercion (parsing dates, weights)
/// - Column removal and renaming
///
/// # Example
/// ```no_run
/// use retail_data_centraliser::etl::Transformer;
/// use retail_data_centraliser::table::Table;
/// use eyre::Result;
///
/// struct ColumnDropper {
///     columns: Vec<&'static str>,
/// }
///
/// impl Transformer for ColumnDropper {
///     type Input = Table;
///     type Output = Table;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output> {
///         input.drop_columns(&self.columns)
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Input type
    type Input: Send;

    /// Output type after transformation
    type Output: Send;

    /// Transform a single input
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Run `next` on the output of this transformer
    fn then<N>(self, next: N) -> Chain<Self, N>
    where
        Self: Sized,
        N: Transformer<Input = Self::Output>,
    {
        Chain { first: self, next }
    }
}

/// Two transformers applied in sequence, built with [`Transformer::then`]
pub struct Chain<A, B> {
    first: A,
    next: B,
}

impl<A, B> Transformer for Chain<A, B>
where
    A: Transformer,
    B: Transformer<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        self.next.transform(self.first.transform(input)?)
    }
}

impl<T> Transformer for Box<T>
where
    T: Transformer + ?Sized,
{
    type Input = T::Input;
    type Output = T::Output;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        (**self).transform(input)
    }
}
