//! Outbound SMS/OTP gateway. The real transport (textlocal-style HTTP API)
//! is an external collaborator; this crate only defines the seam and a
//! tracing-backed implementation used in development and tests.

use async_trait::async_trait;
use rand::Rng;

#[derive(Debug, thiserror::Error)]
#[error("sms delivery failed: {0}")]
pub struct SmsError(pub String);

#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver `message` to `phone_number`. With `test` set the provider must
    /// not actually send anything.
    async fn send(&self, message: &str, phone_number: &str, test: bool) -> Result<(), SmsError>;
}

/// Dev gateway: logs the message instead of sending it.
pub struct LogSmsGateway;

#[async_trait]
impl SmsGateway for LogSmsGateway {
    async fn send(&self, message: &str, phone_number: &str, test: bool) -> Result<(), SmsError> {
        tracing::info!(phone_number, test, "sms: {message}");
        Ok(())
    }
}

/// Six decimal digits, never with a leading zero.
pub fn generate_otp() -> String {
    let otp: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    otp.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(otp.chars().next(), Some('0'));
        }
    }

    #[tokio::test]
    async fn log_gateway_accepts_messages() {
        let gw = LogSmsGateway;
        assert!(gw.send("Your OTP is 123456", "9999999999", true).await.is_ok());
    }
}
