//! HTML pages returned by the verification link. The contact sees these in a
//! browser straight from their mail client, so they are self-contained.

use crate::html::escape;
use crate::models::approval::{ApprovalAction, ApprovalEvent, ApprovalStatus};

const BASE_STYLE: &str = "* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 20px; }
.container { background: white; border-radius: 16px; box-shadow: 0 10px 40px rgba(0,0,0,0.1); max-width: 600px; width: 100%; padding: 60px 40px; text-align: center; }
p { color: #4b5563; font-size: 16px; line-height: 1.6; margin-bottom: 20px; }
.button { display: inline-block; color: white; padding: 14px 32px; border-radius: 8px; text-decoration: none; font-weight: 600; margin-top: 20px; }";

fn layout(title: &str, background: &str, extra_style: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title} - Event Corner</title>
  <style>
{base}
body {{ background: {background}; }}
{extra}
  </style>
</head>
<body>
  <div class="container">
{body}
  </div>
</body>
</html>"#,
        title = escape(title),
        base = BASE_STYLE,
        background = background,
        extra = extra_style,
        body = body,
    )
}

pub fn success_page(action: ApprovalAction, event: &ApprovalEvent) -> String {
    let approved = action == ApprovalAction::Approve;
    let color = if approved { "#10b981" } else { "#ef4444" };
    let title = if approved { "Event Approved!" } else { "Event Rejected" };
    let message = if approved {
        "Thank you! The event has been approved and is now live on Event Corner."
    } else {
        "The event has been rejected and will not be displayed publicly on Event Corner."
    };
    let follow_up = if approved {
        "The event organizer has been notified and the event is now visible to all users."
    } else {
        "The event organizer has been notified that their event was not approved."
    };

    let body = format!(
        r#"    <h1>{title}</h1>
    <p>{message}</p>
    <div class="event-name">
      <h2>{event_title}</h2>
      <p>Category: {category}</p>
    </div>
    <p>{follow_up}</p>
    <a href="/" class="button">View Event Corner</a>
    <div class="footer"><p>Thank you for using Event Corner</p></div>"#,
        title = title,
        message = message,
        event_title = escape(&event.title),
        category = escape(&event.category),
        follow_up = follow_up,
    );

    let extra = format!(
        "h1 {{ color: {color}; font-size: 32px; margin-bottom: 20px; }}
.event-name {{ background: #f3f4f6; padding: 20px; border-radius: 8px; margin: 30px 0; border-left: 4px solid {color}; }}
.event-name h2 {{ color: #1f2937; font-size: 20px; margin-bottom: 8px; }}
.button {{ background: {color}; }}
.footer {{ margin-top: 40px; padding-top: 30px; border-top: 1px solid #e5e7eb; }}
.footer p {{ color: #9ca3af; font-size: 14px; }}"
    );

    layout(title, &format!("linear-gradient(135deg, {color}15 0%, {color}05 100%)"), &extra, &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        r#"    <h1>Verification Failed</h1>
    <p>{}</p>
    <a href="/" class="button">Go to Event Corner</a>"#,
        escape(message)
    );
    layout(
        "Error",
        "linear-gradient(135deg, #fef2f2 0%, #fff 100%)",
        "h1 { color: #dc2626; font-size: 28px; margin-bottom: 16px; }
.button { background: #3b82f6; }",
        &body,
    )
}

pub fn already_responded_page(previous: ApprovalStatus) -> String {
    let body = format!(
        r#"    <h1>Already Responded</h1>
    <div class="status">This event was previously {}</div>
    <p>You have already responded to this verification request.</p>"#,
        previous
    );
    layout(
        "Already Responded",
        "linear-gradient(135deg, #eff6ff 0%, #fff 100%)",
        "h1 { color: #1f2937; font-size: 28px; margin-bottom: 16px; }
.status { background: #f3f4f6; padding: 15px; border-radius: 8px; margin: 20px 0; font-weight: 600; color: #374151; }",
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event() -> ApprovalEvent {
        ApprovalEvent {
            id: 42,
            title: "Hack & Learn".into(),
            description: None,
            category: "competition".into(),
            venue_name: None,
            venue_type: None,
            contact_email: None,
            approval_status: Some(ApprovalStatus::Approved),
            approval_token: None,
            approval_token_expires_at: None,
            approval_responded_at: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_success_page_reports_action() {
        let approved = success_page(ApprovalAction::Approve, &event());
        assert!(approved.contains("<title>Event Approved! - Event Corner</title>"));
        assert!(approved.contains("Hack &amp; Learn"));
        assert!(approved.contains("Category: competition"));

        let rejected = success_page(ApprovalAction::Reject, &event());
        assert!(rejected.contains("Event Rejected"));
        assert!(rejected.contains("#ef4444"));
    }

    #[test]
    fn test_already_responded_names_previous_outcome() {
        assert!(already_responded_page(ApprovalStatus::Approved)
            .contains("This event was previously approved"));
        assert!(already_responded_page(ApprovalStatus::Rejected)
            .contains("This event was previously rejected"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let page = error_page("<b>bad</b>");
        assert!(page.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(page.contains("Verification Failed"));
    }
}
