use thiserror::Error;

/// Failure taxonomy for the fetch pipeline.
///
/// Every variant is recoverable at the display boundary: the caller halts
/// the current render cycle and reports the offending location. No retry
/// or partial degradation happens below that boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a decodable response: connection refused,
    /// DNS failure, timeout, or an aborted body read.
    #[error("network request to OpenWeather failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered, but its in-band status marked the query as failed.
    /// Covers unknown locations and rejected credentials alike; the API
    /// does not let us tell them apart beyond its own message.
    #[error("OpenWeather rejected location '{location}': {message}")]
    InvalidLocation { location: String, message: String },

    /// The payload was not the shape the endpoint documents: not JSON at
    /// all, or a success envelope with a required field missing.
    #[error("malformed OpenWeather response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_location_names_the_location() {
        let err = FetchError::InvalidLocation {
            location: "Atlantis".to_string(),
            message: "city not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Atlantis"));
        assert!(msg.contains("city not found"));
    }

    #[test]
    fn malformed_response_carries_reason() {
        let err = FetchError::MalformedResponse("missing `main` block".to_string());
        assert!(err.to_string().contains("missing `main` block"));
    }
}
