use anyhow::Result;
use regex::Regex;
use std::env;
use tracing::{debug, warn};

/// Substitute environment variables in the format ${VAR_NAME}
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)\}").unwrap();
    let mut result = content.to_string();
    let mut missing_vars = Vec::new();

    for caps in re.captures_iter(content) {
        let var_name = caps.get(1).unwrap().as_str();
        let placeholder = caps.get(0).unwrap().as_str();

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {}", var_name);
                result = result.replace(placeholder, &value);
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                // Keep the placeholder; validation surfaces it later
            }
        }
    }

    if !missing_vars.is_empty() {
        debug!("Unresolved environment variables: {:?}", missing_vars);
    }

    Ok(result)
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    let re = Regex::new(r"\$\{(\w+)\}").unwrap();
    re.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        env::set_var("BROKERAGE_TEST_NAME", "Seagull Securities");
        let out = substitute_env_vars("name: ${BROKERAGE_TEST_NAME}").unwrap();
        assert_eq!(out, "name: Seagull Securities");
        env::remove_var("BROKERAGE_TEST_NAME");
    }

    #[test]
    fn test_missing_var_kept() {
        let out = substitute_env_vars("name: ${BROKERAGE_TEST_UNSET_VAR}").unwrap();
        assert!(has_unresolved_env_vars(&out));
    }
}
