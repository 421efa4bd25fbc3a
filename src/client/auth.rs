use std::fmt;

/// How requests to the stores API authenticate
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Send the key in the `x-api-key` header
    ApiKey(String),
    /// Don't send any credentials (public object storage)
    None,
}

impl Auth {
    /// Build from an optional key, treating an empty key as no auth
    pub fn new(apikey: Option<String>) -> Self {
        match apikey {
            Some(key) if !key.trim().is_empty() => Self::ApiKey(key),
            _ => Self::None,
        }
    }
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "ApiKey"),
            Self::None => write!(f, "None"),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "ApiKey(<redacted>)"),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_no_auth() {
        assert_eq!(Auth::new(Some("  ".to_string())), Auth::None);
        assert_eq!(Auth::new(None), Auth::None);
    }

    #[test]
    fn test_debug_hides_key() {
        let auth = Auth::new(Some("secret".to_string()));
        assert_eq!(auth.to_string(), "ApiKey");
        assert!(!format!("{:?}", auth).contains("secret"));
    }
}
