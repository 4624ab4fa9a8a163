//! Inline submit handler.
//!
//! The generated script runs three steps in order: optional reCAPTCHA v3
//! token acquisition, optional POST to the notification endpoint, then a
//! success message and form reset. A missing or failing reCAPTCHA library
//! resolves to "no token" and the submission continues.

use serde_json::{json, Value};

use crate::settings::{EmailProvider, Settings};

use super::escape::{html, query_component, script_json};
use super::{
    EMAIL_ENDPOINT_PLACEHOLDER, FORM_ID, MASKED_SECRET, MESSAGE_ID, RECAPTCHA_VERIFY_PLACEHOLDER,
    SUCCESS_MESSAGE,
};

const RECAPTCHA_SRC: &str = "https://www.google.com/recaptcha/api.js";

/// Static body of the submit handler. `config` is injected above it.
const HANDLER_JS: &str = r#"  var form = document.getElementById(config.formId);
  var message = document.getElementById(config.messageId);
  if (!form) { return; }

  function getRecaptchaToken() {
    if (!config.recaptcha) { return Promise.resolve(null); }
    return new Promise(function (resolve) {
      if (typeof grecaptcha === 'undefined') { resolve(null); return; }
      try {
        grecaptcha.ready(function () {
          grecaptcha.execute(config.recaptcha.siteKey, { action: config.recaptcha.action })
            .then(resolve, function () { resolve(null); });
        });
      } catch (err) {
        resolve(null);
      }
    });
  }

  function sendNotification(reservation, token) {
    if (!config.email) { return Promise.resolve(); }
    var payload = {
      provider: config.email.provider,
      to: config.email.to,
      subject: config.email.subject,
      template: config.email.template,
      sendConfirmation: config.email.confirmation,
      smtp: config.email.smtp,
      recaptchaToken: token,
      reservation: reservation
    };
    return fetch(config.email.endpoint, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(payload)
    }).catch(function (err) {
      console.warn('Reservation notification failed', err);
    });
  }

  form.addEventListener('submit', function (event) {
    event.preventDefault();
    var reservation = {};
    new FormData(form).forEach(function (value, key) { reservation[key] = value; });
    getRecaptchaToken()
      .then(function (token) { return sendNotification(reservation, token); })
      .then(function () {
        if (message) {
          message.textContent = config.successMessage;
          message.style.display = 'block';
        }
        form.reset();
      });
  });
"#;

/// Client-side configuration consumed by [`HANDLER_JS`]. Secrets are
/// replaced by [`MASKED_SECRET`] before they get here.
fn client_config(settings: &Settings) -> Value {
    let recaptcha = if settings.enable_recaptcha {
        json!({
            "siteKey": settings.recaptcha_site_key,
            "action": settings.recaptcha_action,
            "threshold": settings.recaptcha_threshold,
            "verifyEndpoint": RECAPTCHA_VERIFY_PLACEHOLDER,
        })
    } else {
        Value::Null
    };

    let email = if settings.enable_email_notifications {
        let recipients: Vec<&str> = settings
            .notification_emails
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect();
        let smtp = match settings.email_provider {
            EmailProvider::Smtp => json!({
                "host": settings.smtp_host,
                "port": settings.smtp_port,
                "user": settings.smtp_user,
                "password": MASKED_SECRET,
                "secure": settings.smtp_secure,
                "fromEmail": settings.smtp_from_email,
                "fromName": settings.smtp_from_name,
            }),
            EmailProvider::Simple => Value::Null,
        };
        json!({
            "endpoint": EMAIL_ENDPOINT_PLACEHOLDER,
            "provider": settings.email_provider,
            "to": recipients,
            "subject": settings.email_subject,
            "template": settings.email_template,
            "confirmation": settings.confirmation_email,
            "smtp": smtp,
        })
    } else {
        Value::Null
    };

    json!({
        "formId": FORM_ID,
        "messageId": MESSAGE_ID,
        "recaptcha": recaptcha,
        "email": email,
        "successMessage": SUCCESS_MESSAGE,
    })
}

/// The reCAPTCHA library tag, present only when reCAPTCHA is enabled.
pub fn recaptcha_tag(settings: &Settings) -> Option<String> {
    settings.enable_recaptcha.then(|| {
        format!(
            "<script src=\"{RECAPTCHA_SRC}?render={}\" async defer></script>\n",
            html(&query_component(&settings.recaptcha_site_key))
        )
    })
}

/// Note telling the integrator where masked credentials go. Empty when
/// nothing was masked.
pub fn credentials_notice(settings: &Settings) -> String {
    let mut masked = Vec::new();
    if settings.enable_email_notifications && settings.email_provider == EmailProvider::Smtp {
        masked.push("SMTP password");
    }
    if settings.enable_recaptcha {
        masked.push("reCAPTCHA secret key");
    }
    if masked.is_empty() {
        return String::new();
    }
    format!(
        "<!-- Credentials masked as {MASKED_SECRET}: {}. Inject the real values server-side \
         at {EMAIL_ENDPOINT_PLACEHOLDER} and {RECAPTCHA_VERIFY_PLACEHOLDER}; never ship them \
         in page markup. -->\n",
        masked.join(", ")
    )
}

/// The complete inline `<script>` block.
pub fn submit_script(settings: &Settings) -> String {
    let mut out = String::new();
    out.push_str("<script>\n(function () {\n");
    out.push_str(&format!(
        "  var config = {};\n",
        script_json(&client_config(settings))
    ));
    out.push_str(HANDLER_JS);
    out.push_str("})();\n</script>\n");
    out
}
