//! Settings-to-markup generator.
//!
//! [`render_widget`] turns a [`Settings`] value into a self-contained HTML
//! fragment: a `<style>` block, the widget markup, and an inline
//! `<script>` submit handler. [`render_document`] wraps the same fragment in
//! a complete page for the static HTML export.
//!
//! Both functions are pure. Output depends only on the input settings, so
//! identical settings always render byte-identical strings. Secret fields
//! (`smtpPassword`, `recaptchaSecretKey`) are never emitted; generated code
//! carries [`MASKED_SECRET`] instead.

pub mod escape;
pub mod form;
pub mod script;
pub mod styles;

use crate::settings::{BackgroundType, Settings};

use escape::{css_value, html};

/// Placeholder emitted wherever a credential would otherwise appear.
pub const MASKED_SECRET: &str = "********";

/// Endpoint the generated script POSTs reservations to. The integrator
/// provides it; this service does not.
pub const EMAIL_ENDPOINT_PLACEHOLDER: &str = "/api/send-reservation-email";

/// Endpoint expected to verify reCAPTCHA tokens with the secret key.
pub const RECAPTCHA_VERIFY_PLACEHOLDER: &str = "/api/verify-recaptcha";

pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your reservation request has been received. We will confirm shortly.";

pub const WIDGET_ID: &str = "trb-widget";
pub const FORM_ID: &str = "trb-reservation-form";
pub const MESSAGE_ID: &str = "trb-message";

/// Overlay element drawn between a background image and the content.
fn overlay(settings: &Settings) -> Option<String> {
    let applies = settings.background_type == BackgroundType::Image
        && settings.background_overlay
        && !settings.background_image.trim().is_empty();
    applies.then(|| {
        format!(
            "  <div class=\"trb-overlay\" style=\"position: absolute; inset: 0; \
             background-color: {}; opacity: {}; pointer-events: none;\"></div>\n",
            html(&css_value(&settings.overlay_color)),
            settings.overlay_opacity.clamp(0.0, 1.0),
        )
    })
}

/// Render the embeddable widget fragment.
pub fn render_widget(settings: &Settings) -> String {
    let mut out = String::new();
    out.push_str("<!-- Table Reservation Widget -->\n");
    out.push_str(&script::credentials_notice(settings));
    if let Some(tag) = script::recaptcha_tag(settings) {
        out.push_str(&tag);
    }
    out.push_str(&styles::stylesheet(settings));
    out.push_str(&format!("<div class=\"trb-widget\" id=\"{WIDGET_ID}\">\n"));
    if let Some(layer) = overlay(settings) {
        out.push_str(&layer);
    }
    out.push_str("  <div class=\"trb-content\">\n");
    out.push_str(&format!(
        "    <h2 class=\"trb-title\">{}</h2>\n",
        html(&settings.title)
    ));
    if !settings.subtitle.is_empty() {
        out.push_str(&format!(
            "    <p class=\"trb-subtitle\">{}</p>\n",
            html(&settings.subtitle)
        ));
    }
    out.push_str(&form::form(settings));
    out.push_str("  </div>\n");
    out.push_str("</div>\n");
    out.push_str(&script::submit_script(settings));
    out
}

/// Render a complete standalone HTML document around the widget.
pub fn render_document(settings: &Settings) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html lang=\"en\">\n");
    out.push_str("<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", html(&settings.title)));
    out.push_str("</head>\n");
    out.push_str("<body>\n");
    out.push_str(&render_widget(settings));
    out.push_str("</body>\n");
    out.push_str("</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ButtonStyle, EmailProvider, FormLayout, Shadow};

    fn fully_loaded() -> Settings {
        Settings {
            title: "Trattoria <Luna>".to_string(),
            background_type: BackgroundType::Image,
            background_image: "https://cdn.example/dining-room.jpg".to_string(),
            background_overlay: true,
            overlay_opacity: 0.5,
            button_style: ButtonStyle::Gradient,
            shadow: Shadow::Xlarge,
            form_layout: FormLayout::Grid,
            enable_recaptcha: true,
            recaptcha_site_key: "6LcPublicSiteKey".to_string(),
            recaptcha_secret_key: "6LcVerySecretServerKey".to_string(),
            enable_email_notifications: true,
            email_provider: EmailProvider::Smtp,
            notification_emails: vec!["bookings@luna.example".to_string()],
            smtp_host: "smtp.luna.example".to_string(),
            smtp_user: "mailer".to_string(),
            smtp_password: "Sup3r-Secret-Smtp-Pass".to_string(),
            ..Settings::default()
        }
    }

    fn field_count(out: &str, name: &str) -> usize {
        out.matches(&format!("name=\"{name}\"")).count()
    }

    #[test]
    fn rendering_is_deterministic() {
        let settings = fully_loaded();
        assert_eq!(render_widget(&settings), render_widget(&settings));
        assert_eq!(render_document(&settings), render_document(&settings.clone()));
    }

    #[test]
    fn secrets_never_appear() {
        let out = render_document(&fully_loaded());
        assert!(!out.contains("Sup3r-Secret-Smtp-Pass"));
        assert!(!out.contains("6LcVerySecretServerKey"));
        assert!(out.contains(MASKED_SECRET));
        assert!(out.contains("6LcPublicSiteKey"));
    }

    #[test]
    fn toggles_control_field_presence() {
        use form::{FIELD_DATE, FIELD_GUESTS, FIELD_REQUESTS, FIELD_TIME};

        let on = render_widget(&Settings::default());
        for name in [FIELD_DATE, FIELD_TIME, FIELD_GUESTS, FIELD_REQUESTS] {
            assert_eq!(field_count(&on, name), 1, "{name} should render once");
        }

        let off = render_widget(&Settings {
            show_date_picker: false,
            show_time_picker: false,
            show_guest_count: false,
            show_special_requests: false,
            ..Settings::default()
        });
        for name in [FIELD_DATE, FIELD_TIME, FIELD_GUESTS, FIELD_REQUESTS] {
            assert_eq!(field_count(&off, name), 0, "{name} should be absent");
        }
    }

    #[test]
    fn image_overlay_is_rendered_with_opacity() {
        let out = render_widget(&fully_loaded());
        assert!(out.contains("background-image: url('https://cdn.example/dining-room.jpg')"));
        let overlay_line = out
            .lines()
            .find(|l| l.contains("class=\"trb-overlay\""))
            .expect("overlay element present");
        assert!(overlay_line.contains("position: absolute; inset: 0;"));
        assert!(overlay_line.contains("opacity: 0.5;"));
    }

    #[test]
    fn overlay_needs_image_background() {
        let settings = Settings {
            background_overlay: true,
            ..Settings::default()
        };
        assert!(!render_widget(&settings).contains("trb-overlay"));
    }

    #[test]
    fn recaptcha_script_only_when_enabled() {
        assert!(!render_widget(&Settings::default()).contains("recaptcha/api.js"));
        assert!(render_widget(&fully_loaded()).contains("recaptcha/api.js?render=6LcPublicSiteKey"));
    }

    #[test]
    fn user_text_is_escaped() {
        let out = render_widget(&fully_loaded());
        assert!(out.contains("Trattoria &lt;Luna&gt;"));
        assert!(!out.contains("<Luna>"));
    }

    #[test]
    fn document_wraps_fragment() {
        let settings = Settings::default();
        let doc = render_document(&settings);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(&render_widget(&settings)));
        assert!(doc.trim_end().ends_with("</html>"));
    }

    #[test]
    fn rendering_does_not_touch_input() {
        let settings = fully_loaded();
        let before = settings.clone();
        let _ = render_document(&settings);
        assert_eq!(settings, before);
    }
}
