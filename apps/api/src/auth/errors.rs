//! Maps auth service messages to the strings shown to users.
//! Matching is by substring because the service's wording is the only contract.

const SIGN_UP_RULES: &[(&str, &str)] = &[
    (
        "User already registered",
        "An account with this email already exists",
    ),
    (
        "Password should be at least",
        "Password should be at least 6 characters long",
    ),
    ("Username is already taken", "Username is already taken"),
];

const SIGN_IN_RULES: &[(&str, &str)] = &[
    (
        "Invalid login credentials",
        "Invalid email or password. Please check your credentials and try again.",
    ),
    (
        "Email not confirmed",
        "Please check your email and click the confirmation link before signing in.",
    ),
    (
        "Too many requests",
        "Too many login attempts. Please wait a moment and try again.",
    ),
];

fn map_with(rules: &[(&str, &str)], message: &str, fallback: &str) -> String {
    if let Some((_, friendly)) = rules.iter().find(|(needle, _)| message.contains(needle)) {
        return (*friendly).to_string();
    }
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

pub fn map_sign_up_error(message: &str) -> String {
    map_with(SIGN_UP_RULES, message, "Failed to create account")
}

pub fn map_sign_in_error(message: &str) -> String {
    map_with(SIGN_IN_RULES, message, "Failed to sign in")
}
