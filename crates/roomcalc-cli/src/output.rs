use serde::Serialize;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            api_version: env!("CARGO_PKG_VERSION"),
            data: Some(data),
            error: None,
        }
    }
}

impl CliResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            api_version: env!("CARGO_PKG_VERSION"),
            data: None,
            error: Some(message.into()),
        }
    }
}

pub fn output_success<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&CliResponse::success(data))?);
    Ok(())
}

/// Prints an error response to stderr and terminates with exit code 1.
pub fn output_error(message: &str) -> ! {
    match serde_json::to_string(&CliResponse::failure(message)) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", message),
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(CliResponse::success(42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let json = serde_json::to_value(CliResponse::failure("bad input")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "bad input");
        assert!(json.get("data").is_none());
    }
}
