use aws_config::BehaviorVersion;
use aws_sdk_ses::Client as SesClient;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::NotificationError;

/// Notification service for booking lifecycle emails.
#[derive(Debug, Clone)]
pub struct NotificationService {
    ses_client: SesClient,
    from_email: String,
}

impl NotificationService {
    /// Creates a new instance of the NotificationService with the AWS client initialized.
    pub async fn new() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let ses_client = SesClient::new(&config);

        let from_email =
            std::env::var("FROM_EMAIL").unwrap_or_else(|_| "noreply@campmate.app".to_string());

        Self {
            ses_client,
            from_email,
        }
    }

    /// Emails the requester that their booking request was received and is
    /// awaiting payment.
    pub async fn send_booking_received(
        &self,
        booking_id: &Uuid,
        email: &str,
        spot_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), NotificationError> {
        log::info!(
            "📧 Sending booking-received email to {} for booking {}",
            email,
            booking_id
        );

        let stay = format_stay(start_date, end_date);
        let subject = "Your CampMate booking request was received";
        let html_body = booking_email_html(
            "Request received!",
            &format!(
                "We received your request to stay at <strong>{}</strong> from {}. \
                 Your dates are held while we wait for payment.",
                spot_name, stay
            ),
            "You'll get another email as soon as your booking is confirmed.",
        );
        let text_body = format!(
            "Request received!\n\nWe received your request to stay at {} from {}.\n\
             Your dates are held while we wait for payment.\n\n© 2025 CampMate",
            spot_name, stay
        );

        self.send_email(email, subject, html_body, text_body).await
    }

    /// Emails the requester that payment cleared and the stay is confirmed.
    pub async fn send_booking_confirmed(
        &self,
        booking_id: &Uuid,
        email: &str,
        spot_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), NotificationError> {
        log::info!(
            "📧 Sending booking-confirmed email to {} for booking {}",
            email,
            booking_id
        );

        let stay = format_stay(start_date, end_date);
        let subject = "Your CampMate booking is confirmed";
        let html_body = booking_email_html(
            "You're all set!",
            &format!(
                "Your stay at <strong>{}</strong> from {} is confirmed. \
                 Pack your tent and we'll see you there.",
                spot_name, stay
            ),
            "Need to change your plans? You can cancel any time before your stay ends.",
        );
        let text_body = format!(
            "You're all set!\n\nYour stay at {} from {} is confirmed.\n\n© 2025 CampMate",
            spot_name, stay
        );

        self.send_email(email, subject, html_body, text_body).await
    }

    /// Emails the requester that their booking was cancelled.
    pub async fn send_booking_cancelled(
        &self,
        booking_id: &Uuid,
        email: &str,
        spot_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), NotificationError> {
        log::info!(
            "📧 Sending booking-cancelled email to {} for booking {}",
            email,
            booking_id
        );

        let stay = format_stay(start_date, end_date);
        let subject = "Your CampMate booking was cancelled";
        let html_body = booking_email_html(
            "Booking cancelled",
            &format!(
                "Your booking at <strong>{}</strong> for {} has been cancelled \
                 and the dates are open again.",
                spot_name, stay
            ),
            "If this wasn't you, please reach out to the spot owner.",
        );
        let text_body = format!(
            "Booking cancelled\n\nYour booking at {} for {} has been cancelled.\n\n© 2025 CampMate",
            spot_name, stay
        );

        self.send_email(email, subject, html_body, text_body).await
    }

    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: String,
        text_body: String,
    ) -> Result<(), NotificationError> {
        let subject_content = aws_sdk_ses::types::Content::builder()
            .data(subject)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build subject content: {}", e);
                NotificationError::SesError(format!("Failed to build subject: {}", e))
            })?;

        let html_content = aws_sdk_ses::types::Content::builder()
            .data(html_body)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build HTML content: {}", e);
                NotificationError::SesError(format!("Failed to build HTML body: {}", e))
            })?;

        let text_content = aws_sdk_ses::types::Content::builder()
            .data(text_body)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build text content: {}", e);
                NotificationError::SesError(format!("Failed to build text body: {}", e))
            })?;

        let body = aws_sdk_ses::types::Body::builder()
            .html(html_content)
            .text(text_content)
            .build();

        let message = aws_sdk_ses::types::Message::builder()
            .subject(subject_content)
            .body(body)
            .build();

        let destination = aws_sdk_ses::types::Destination::builder()
            .to_addresses(to)
            .build();

        let result = self
            .ses_client
            .send_email()
            .source(&self.from_email)
            .destination(destination)
            .message(message)
            .send()
            .await;

        match result {
            Ok(output) => {
                log::info!(
                    "✅ Email sent to {} (SES message ID: {})",
                    to,
                    output.message_id()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("❌ AWS SES error: {:#?}", e);
                let error_msg = if let Some(service_error) = e.as_service_error() {
                    format!("AWS SES service error: {:?}", service_error)
                } else {
                    format!("AWS SES error: {}", e)
                };
                Err(NotificationError::SesError(error_msg))
            }
        }
    }
}

fn format_stay(start_date: NaiveDate, end_date: NaiveDate) -> String {
    format!(
        "{} through {}",
        start_date.format("%B %e, %Y"),
        end_date.format("%B %e, %Y")
    )
}

fn booking_email_html(heading: &str, message: &str, footnote: &str) -> String {
    format!(
        r#"
        <html>
        <body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <div style="background: linear-gradient(135deg, #2c3e50 0%, #4a6741 100%); padding: 20px; text-align: center;">
                <h1 style="color: white; margin: 0;">🏕️ CampMate</h1>
            </div>
            <div style="padding: 30px; background: white;">
                <h2 style="color: #2c3e50;">{}</h2>
                <p style="font-size: 16px; line-height: 1.6; color: #374151;">
                    {}
                </p>
                <p style="font-size: 14px; color: #6b7280;">
                    {}
                </p>
            </div>
            <div style="background: #f9fafb; padding: 20px; text-align: center; color: #6b7280; font-size: 12px;">
                <p>© 2025 CampMate. Happy camping!</p>
            </div>
        </body>
        </html>
        "#,
        heading, message, footnote
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stay_dates_are_spelled_out() {
        let stay = format_stay(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
        );

        assert_eq!(stay, "July  1, 2025 through July  5, 2025");
    }

    #[test]
    fn booking_emails_carry_the_message() {
        let html = booking_email_html("Request received!", "Testing the body", "Small print");

        assert!(html.contains("CampMate"));
        assert!(html.contains("Request received!"));
        assert!(html.contains("Testing the body"));
        assert!(html.contains("Small print"));
    }
}
