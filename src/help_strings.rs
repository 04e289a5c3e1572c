//! Help overlay content loaded from `help-strings/*.txt` at compile time.

macro_rules! include_help {
    ($name:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/help-strings/",
            $name,
            ".txt"
        ))
    };
}

pub fn dashboard() -> &'static str {
    include_help!("dashboard")
}

pub fn open_prompt() -> &'static str {
    include_help!("open_prompt")
}
