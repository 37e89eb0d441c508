//! Email bodies. Every event-supplied value is escaped before it is interpolated.

use crate::html::{escape, truncate};
use crate::models::approval::{ApprovalEvent, ApprovalStatus};

const APPROVE_COLOR: &str = "#10b981";
const REJECT_COLOR: &str = "#ef4444";
const DESCRIPTION_PREVIEW_CHARS: usize = 150;

pub fn approval_request_subject(event: &ApprovalEvent) -> String {
    format!("Event Approval Request - {}", event.title)
}

fn creator_name(event: &ApprovalEvent) -> Option<&str> {
    event
        .created_by
        .as_ref()
        .and_then(|c| c.full_name.as_deref())
        .filter(|n| !n.is_empty())
}

pub fn approval_request_html(
    event: &ApprovalEvent,
    approval_url: &str,
    rejection_url: &str,
    ttl_days: i64,
) -> String {
    let description = event
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| {
            format!(
                "<p><strong>Description:</strong> {}</p>",
                escape(&truncate(d, DESCRIPTION_PREVIEW_CHARS))
            )
        })
        .unwrap_or_default();
    let created_by = creator_name(event)
        .map(|n| format!("<p><strong>Created By:</strong> {}</p>", escape(n)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Event Approval Request</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f5f5f5;">
  <div style="background-color: #ffffff; border-radius: 8px; padding: 30px;">
    <div style="text-align: center; padding-bottom: 20px; border-bottom: 2px solid #e5e7eb;">
      <div style="font-size: 24px; font-weight: bold; color: #3b82f6;">Event Corner</div>
      <h2 style="color: #1f2937; margin: 10px 0;">Event Approval Request</h2>
    </div>
    <p>Hi there,</p>
    <p>An event has been created on <strong>Event Corner</strong> using your email address as the contact information:</p>
    <div style="background-color: #f9fafb; border-left: 4px solid #3b82f6; padding: 15px; margin: 20px 0;">
      <h3 style="margin: 0 0 10px 0; color: #1f2937;">{title}</h3>
      {description}
      <p><strong>Category:</strong> {category}</p>
      <p><strong>Venue:</strong> {venue_name} ({venue_type})</p>
      {created_by}
    </div>
    <p><strong>We need your permission</strong> to display this event publicly on our platform.</p>
    <div style="background-color: #fef3c7; border-left: 4px solid #f59e0b; padding: 15px; margin: 20px 0; color: #92400e;">
      <strong>Important:</strong> If you don't recognize this event or didn't authorize its creation, please reject it.
    </div>
    <div style="text-align: center; margin: 30px 0;">
      <a href="{approval_url}" style="display: inline-block; padding: 14px 28px; margin: 10px; border-radius: 6px; text-decoration: none; font-weight: 600; background-color: {approve}; color: #ffffff;">Approve Event</a>
      <a href="{rejection_url}" style="display: inline-block; padding: 14px 28px; margin: 10px; border-radius: 6px; text-decoration: none; font-weight: 600; background-color: {reject}; color: #ffffff;">Reject Event</a>
    </div>
    <p style="color: #6b7280; font-size: 14px;">
      <strong>What happens next?</strong><br>
      If you approve, the event will be published on our website.<br>
      If you reject, the event will not be shown publicly.
    </p>
    <p style="color: #6b7280; font-size: 14px;"><em>This verification link expires in {ttl_days} days.</em></p>
    <div style="text-align: center; padding-top: 20px; border-top: 2px solid #e5e7eb; color: #6b7280; font-size: 14px;">
      <p>This email was sent by Event Corner</p>
      <p>If you have any questions, please contact our support team.</p>
    </div>
  </div>
</body>
</html>"#,
        title = escape(&event.title),
        description = description,
        category = escape(&event.category),
        venue_name = escape(event.venue_name.as_deref().unwrap_or("TBA")),
        venue_type = escape(event.venue_type.as_deref().unwrap_or("unspecified")),
        created_by = created_by,
        approval_url = escape(approval_url),
        rejection_url = escape(rejection_url),
        approve = APPROVE_COLOR,
        reject = REJECT_COLOR,
        ttl_days = ttl_days,
    )
}

pub fn approval_request_text(
    event: &ApprovalEvent,
    approval_url: &str,
    rejection_url: &str,
    ttl_days: i64,
) -> String {
    let created_by = creator_name(event)
        .map(|n| format!("Created By: {}\n", n))
        .unwrap_or_default();

    format!(
        "Event Approval Request\n\
         \n\
         Hi there,\n\
         \n\
         An event has been created on Event Corner using your email address as the contact information:\n\
         \n\
         Event Name: {title}\n\
         Category: {category}\n\
         Venue: {venue}\n\
         {created_by}\
         \n\
         We need your permission to display this event publicly on our platform.\n\
         \n\
         To APPROVE the event, visit: {approval_url}\n\
         To REJECT the event, visit: {rejection_url}\n\
         \n\
         If you approve, the event will be published on our website.\n\
         If you reject, the event will not be shown publicly.\n\
         \n\
         This link expires in {ttl_days} days.\n\
         \n\
         Best regards,\n\
         Event Corner Team",
        title = event.title,
        category = event.category,
        venue = event.venue_name.as_deref().unwrap_or("TBA"),
        created_by = created_by,
        approval_url = approval_url,
        rejection_url = rejection_url,
        ttl_days = ttl_days,
    )
}

pub fn outcome_subject(event: &ApprovalEvent, status: ApprovalStatus) -> String {
    match status {
        ApprovalStatus::Approved => format!("Event Approved: {}", event.title),
        _ => format!("Event Rejected: {}", event.title),
    }
}

pub fn outcome_html(event: &ApprovalEvent, status: ApprovalStatus) -> String {
    let approved = status == ApprovalStatus::Approved;
    let color = if approved { APPROVE_COLOR } else { REJECT_COLOR };
    let heading = if approved { "Event Approved!" } else { "Event Rejected" };
    let closing = if approved {
        "<p><strong>Your event is now live</strong> and visible to all users on Event Corner!</p>"
    } else {
        "<p>Your event will <strong>not be displayed publicly</strong> on Event Corner. The contact person did not authorize the use of their email.</p>"
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; padding: 20px; max-width: 600px; margin: 0 auto;">
  <h2 style="color: {color};">{heading}</h2>
  <p>Hi,</p>
  <p>The contact person has <strong>{status}</strong> your event:</p>
  <div style="background-color: #f9fafb; padding: 15px; border-left: 4px solid {color}; margin: 20px 0;">
    <h3 style="margin: 0 0 10px 0;">{title}</h3>
    <p style="margin: 5px 0;">Category: {category}</p>
  </div>
  {closing}
  <p>Best regards,<br>Event Corner Team</p>
</body>
</html>"#,
        color = color,
        heading = heading,
        status = status,
        title = escape(&event.title),
        category = escape(&event.category),
        closing = closing,
    )
}
