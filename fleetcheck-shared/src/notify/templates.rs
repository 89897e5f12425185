/// Message templates for the standard notification kinds
///
/// Each email template produces both an HTML and a plain-text body. SMS
/// analogs are short single-line strings. Values are interpolated directly;
/// none of the inputs are user-controlled HTML.

/// A rendered email ready to hand to the sender
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Subject line
    pub subject: String,

    /// HTML body
    pub html: String,

    /// Plain-text body
    pub text: String,
}

fn wrap_html(title: &str, body_html: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html><body style=\"font-family: sans-serif; color: #1a1a2e;\">\
         <h2>{title}</h2>{body_html}\
         <p style=\"color: #888; font-size: 12px;\">FleetCheck &middot; automated message, do not reply</p>\
         </body></html>"
    )
}

/// Welcome email for a newly created account
pub fn welcome_email(full_name: &str, company_name: &str) -> EmailMessage {
    EmailMessage {
        subject: format!("Welcome to FleetCheck, {}", full_name),
        html: wrap_html(
            "Welcome to FleetCheck",
            &format!(
                "<p>Hi {full_name},</p>\
                 <p>Your account at <strong>{company_name}</strong> is ready. \
                 You can now log in and start running inspections.</p>"
            ),
        ),
        text: format!(
            "Hi {full_name},\n\nYour account at {company_name} is ready. \
             You can now log in and start running inspections.\n"
        ),
    }
}

/// Password reset email with the one-time reset link
pub fn password_reset_email(full_name: &str, reset_url: &str) -> EmailMessage {
    EmailMessage {
        subject: "Reset your FleetCheck password".to_string(),
        html: wrap_html(
            "Password reset",
            &format!(
                "<p>Hi {full_name},</p>\
                 <p>A password reset was requested for your account. \
                 The link below is valid for one hour and can be used once.</p>\
                 <p><a href=\"{reset_url}\">Reset password</a></p>\
                 <p>If you did not request this, you can ignore this email.</p>"
            ),
        ),
        text: format!(
            "Hi {full_name},\n\nA password reset was requested for your account. \
             The link below is valid for one hour and can be used once.\n\n{reset_url}\n\n\
             If you did not request this, you can ignore this email.\n"
        ),
    }
}

/// Reminder that a vehicle inspection is due
pub fn inspection_reminder_email(
    full_name: &str,
    vehicle_name: &str,
    license_plate: &str,
) -> EmailMessage {
    EmailMessage {
        subject: format!("Inspection due: {} ({})", vehicle_name, license_plate),
        html: wrap_html(
            "Inspection due",
            &format!(
                "<p>Hi {full_name},</p>\
                 <p>Vehicle <strong>{vehicle_name}</strong> ({license_plate}) has an \
                 inspection due. Please complete it at your earliest opportunity.</p>"
            ),
        ),
        text: format!(
            "Hi {full_name},\n\nVehicle {vehicle_name} ({license_plate}) has an inspection \
             due. Please complete it at your earliest opportunity.\n"
        ),
    }
}

/// Notification that an issue was reported against a vehicle
pub fn issue_notification_email(
    full_name: &str,
    vehicle_name: &str,
    severity: &str,
    description: &str,
) -> EmailMessage {
    EmailMessage {
        subject: format!("[{}] Issue reported on {}", severity, vehicle_name),
        html: wrap_html(
            "Issue reported",
            &format!(
                "<p>Hi {full_name},</p>\
                 <p>A <strong>{severity}</strong> issue was reported on \
                 <strong>{vehicle_name}</strong>:</p>\
                 <blockquote>{description}</blockquote>"
            ),
        ),
        text: format!(
            "Hi {full_name},\n\nA {severity} issue was reported on {vehicle_name}:\n\n\
             {description}\n"
        ),
    }
}

/// SMS analog of the inspection reminder
pub fn inspection_reminder_sms(vehicle_name: &str, license_plate: &str) -> String {
    format!("FleetCheck: inspection due for {vehicle_name} ({license_plate}).")
}

/// SMS analog of the issue notification
pub fn issue_notification_sms(vehicle_name: &str, severity: &str) -> String {
    format!("FleetCheck: {severity} issue reported on {vehicle_name}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_email_contains_names() {
        let message = welcome_email("Ada Lovelace", "Acme Freight");
        assert!(message.subject.contains("Ada Lovelace"));
        assert!(message.html.contains("Acme Freight"));
        assert!(message.text.contains("Acme Freight"));
    }

    #[test]
    fn test_password_reset_email_contains_link() {
        let message = password_reset_email("Ada", "https://app.example/reset?token=abc");
        assert!(message.html.contains("https://app.example/reset?token=abc"));
        assert!(message.text.contains("https://app.example/reset?token=abc"));
        assert!(message.text.contains("used once"));
    }

    #[test]
    fn test_issue_notification_email() {
        let message = issue_notification_email("Ada", "Truck 7", "critical", "Brakes grinding");
        assert!(message.subject.contains("critical"));
        assert!(message.subject.contains("Truck 7"));
        assert!(message.html.contains("Brakes grinding"));
    }

    #[test]
    fn test_sms_templates() {
        let sms = inspection_reminder_sms("Truck 7", "ABC-1");
        assert!(sms.contains("Truck 7"));
        assert!(sms.contains("ABC-1"));

        let sms = issue_notification_sms("Truck 7", "critical");
        assert!(sms.contains("critical"));
    }
}
