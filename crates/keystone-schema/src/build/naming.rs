use keystone_config::NamingConfig;

/// Ensure a physical name is a bounded, non-reserved ASCII identifier.
pub(crate) fn validate_name(name: &str, naming: &NamingConfig) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.len() > naming.max_name_len {
        return Err(format!(
            "name '{name}' exceeds max length {}",
            naming.max_name_len
        ));
    }
    if !name.is_ascii() {
        return Err(format!("name '{name}' must be ASCII"));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("name '{name}' must not start with a digit"));
    }
    if let Some(c) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(format!("name '{name}' contains invalid character '{c}'"));
    }

    // reserved?
    if naming.is_reserved(name) {
        return Err(format!("the word '{name}' is reserved"));
    }

    Ok(())
}
