//! Environment variable names and their defaults.

pub const MODEL_TYPE: &str = "MODEL_TYPE";
pub const DEFAULT_MODEL_TYPE: &str = "azure";

pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const AZURE_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_OPENAI_DEPLOYMENT_NAME: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
pub const AZURE_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

pub const MODEL_NAME: &str = "MODEL_NAME";
pub const DEFAULT_MODEL_NAME: &str = "gpt-3.5-turbo";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_API_BASE: &str = "OPENAI_API_BASE";

pub const DB_TYPE: &str = "DB_TYPE";
pub const DEFAULT_DB_TYPE: &str = "sqlite";

pub const SQLITE_PATH: &str = "SQLITE_PATH";
pub const DEFAULT_SQLITE_PATH: &str = "Chinook.db";

pub const MYSQL_HOST: &str = "MYSQL_HOST";
pub const DEFAULT_MYSQL_HOST: &str = "localhost";
pub const MYSQL_USER: &str = "MYSQL_USER";
pub const DEFAULT_MYSQL_USER: &str = "root";
pub const MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";
pub const MYSQL_DATABASE: &str = "MYSQL_DATABASE";
pub const MYSQL_PORT: &str = "MYSQL_PORT";
pub const DEFAULT_MYSQL_PORT: &str = "3306";

/// Mask a secret for display, keeping a short prefix and suffix of long values
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else if secret.chars().count() > 8 {
        let chars: Vec<char> = secret.chars().collect();
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("sk-abcdefghijkl"), "sk-a...ijkl");
    }
}
