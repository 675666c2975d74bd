use thiserror::Error;

/// Why a weather fetch produced no report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// At least one endpoint answered with a non-success status.
    #[error("API error: current={status_current}, forecast={status_forecast}")]
    ApiError { status_current: u16, status_forecast: u16 },

    /// Timeout, DNS failure, refused or reset connection.
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// A body was not JSON or lacked a required field.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse { message: message.into() }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected { message: message.into() }
    }

    /// Message shown to the user in place of the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiError { status_current, status_forecast } => format!(
                "API Error: Status Code {status_current} or {status_forecast}. \
                 Please check the API key or city."
            ),
            Self::NetworkError { message } => {
                format!("Network Error: {message}. Please check your internet connection.")
            }
            Self::MalformedResponse { message } => format!(
                "Unexpected Error: the weather service sent data that could not be read \
                 ({message}). Please try again later."
            ),
            Self::Unexpected { message } => {
                format!("Unexpected Error: {message}. Please try again later.")
            }
        }
    }
}

/// Map a transport-level reqwest failure onto the fetch taxonomy.
pub(crate) fn classify(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::network(format!("request timed out ({err})"))
    } else if err.is_connect() || err.is_request() || err.is_body() {
        FetchError::network(err.to_string())
    } else if err.is_decode() {
        FetchError::malformed(err.to_string())
    } else {
        FetchError::unexpected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_mentions_both_codes() {
        let err = FetchError::ApiError { status_current: 401, status_forecast: 200 };
        let msg = err.user_message();

        assert!(msg.contains("401"));
        assert!(msg.contains("200"));
        assert!(msg.contains("check the API key or city"));
    }

    #[test]
    fn network_error_message_has_connectivity_hint() {
        let msg = FetchError::network("connection refused").user_message();
        assert!(msg.starts_with("Network Error: connection refused"));
        assert!(msg.contains("internet connection"));
    }

    #[test]
    fn malformed_and_unexpected_messages() {
        let malformed = FetchError::malformed("missing field `current`");
        assert!(malformed.user_message().contains("missing field"));
        assert!(FetchError::unexpected("boom").user_message().contains("try again later"));
    }

    #[test]
    fn display_is_terse() {
        let err = FetchError::ApiError { status_current: 400, status_forecast: 400 };
        assert_eq!(err.to_string(), "API error: current=400, forecast=400");
    }
}
