use sendgrid_notify::email::{
    EmailAttachment, EmailConfig, EmailRequest, EmailResponse, NotificationsConfig,
    create_registry,
};

fn null_config() -> NotificationsConfig {
    NotificationsConfig {
        email: EmailConfig {
            provider: Some("null".to_string()),
            from_address: Some("noreply@example.com".to_string()),
            from_name: Some("Test App".to_string()),
        },
        sendgrid: None,
    }
}

#[tokio::test]
async fn test_null_provider_integration() {
    let config = null_config();
    let registry = create_registry(&config).unwrap();
    let provider = registry.email_provider().unwrap();

    let request = EmailRequest::new(
        config.email.format_from().unwrap(),
        "user@example.com",
        "Test Email from Null Provider",
    )
    .with_text("This is a test email that will only be logged.");

    let response = provider.send_email(request).await;
    assert_eq!(response, EmailResponse::success(None));

    println!("Email logged successfully by {}", provider.name());
}

#[tokio::test]
async fn test_null_provider_with_report_email() {
    let config = null_config();
    let registry = create_registry(&config).unwrap();
    let provider = registry.email_provider().unwrap();

    let report_url = "http://localhost:8080/reports/2026-10";

    let html_body = format!(
        r#"<html>
<body>
    <h2>Your monthly report is ready</h2>
    <p><a href="{}">View report</a></p>
    <p>The PDF is attached.</p>
</body>
</html>"#,
        report_url
    );

    let text_body = format!(
        "Your monthly report is ready\n\n\
         View it at {}\n\n\
         The PDF is attached.",
        report_url
    );

    let request = EmailRequest::new(
        config.email.format_from().unwrap(),
        "customer@example.com",
        "Monthly report",
    )
    .with_html(html_body)
    .with_text(text_body)
    .with_bcc("archive@example.com")
    .with_attachment(EmailAttachment::new(
        b"%PDF-1.4".to_vec(),
        "application/pdf",
        "report.pdf",
    ));

    let response = provider.send_email(request).await;
    assert!(response.is_success());
}
