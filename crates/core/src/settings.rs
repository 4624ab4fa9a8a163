//! Widget settings model.
//!
//! [`Settings`] is the flat configuration object the editor binds its
//! controls to. Every field has a default, and deserialization fills any
//! absent key from [`Settings::default`], so a parsed value is always fully
//! populated. JSON keys are camelCase to match what browser clients send.
//!
//! There are no cross-field invariants. [`Settings::validate`] only checks
//! the same constraints the editor's input widgets impose.

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::validation::{is_css_length, is_hex_color};

/// Largest corner radius the editor slider allows, in pixels.
pub const MAX_BORDER_RADIUS: u32 = 100;

/// Upper bound for the guest-count dropdown.
pub const MAX_GUESTS_LIMIT: u32 = 100;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    #[serde(alias = "solid")]
    Color,
    Gradient,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Modern,
    Classic,
    Minimal,
    Gradient,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    Small,
    Medium,
    #[default]
    Large,
    Xlarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shadow {
    None,
    Small,
    #[default]
    Medium,
    Large,
    Xlarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormLayout {
    Inline,
    #[default]
    Stacked,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    #[default]
    Simple,
    Smtp,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Every customizable aspect of one reservation widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // --- Content ---
    pub title: String,
    pub subtitle: String,
    pub button_text: String,

    // --- Colors ---
    pub title_color: String,
    pub subtitle_color: String,
    pub button_color: String,
    pub button_text_color: String,

    // --- Background ---
    pub background_type: BackgroundType,
    pub background_color: String,
    pub gradient_start: String,
    pub gradient_end: String,
    pub gradient_direction: String,
    pub background_image: String,
    pub background_overlay: bool,
    pub overlay_color: String,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub overlay_opacity: f64,

    // --- Button ---
    pub button_style: ButtonStyle,
    pub button_size: ButtonSize,
    /// Corner radius in pixels, applied to the card and the button.
    pub border_radius: u32,

    // --- Layout ---
    pub alignment: Alignment,
    pub padding: Padding,
    pub max_width: String,
    pub shadow: Shadow,
    pub font_family: String,

    // --- Form fields ---
    pub show_date_picker: bool,
    pub show_time_picker: bool,
    pub show_guest_count: bool,
    pub show_special_requests: bool,
    pub form_layout: FormLayout,
    pub max_guests: u32,

    // --- reCAPTCHA v3 ---
    pub enable_recaptcha: bool,
    pub recaptcha_site_key: String,
    /// Never rendered into generated markup.
    pub recaptcha_secret_key: String,
    /// Minimum score (0.0-1.0) the verifying server should accept.
    pub recaptcha_threshold: f64,
    pub recaptcha_action: String,

    // --- Email notifications ---
    pub enable_email_notifications: bool,
    pub email_provider: EmailProvider,
    pub notification_emails: Vec<String>,
    pub email_subject: String,
    pub email_template: String,
    pub confirmation_email: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    /// Never rendered into generated markup.
    pub smtp_password: String,
    pub smtp_secure: bool,
    pub smtp_from_email: String,
    pub smtp_from_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Reserve Your Table".to_string(),
            subtitle: "Book your perfect dining experience with us".to_string(),
            button_text: "Reserve Now".to_string(),

            title_color: "#1f2937".to_string(),
            subtitle_color: "#6b7280".to_string(),
            button_color: "#3b82f6".to_string(),
            button_text_color: "#ffffff".to_string(),

            background_type: BackgroundType::Color,
            background_color: "#ffffff".to_string(),
            gradient_start: "#667eea".to_string(),
            gradient_end: "#764ba2".to_string(),
            gradient_direction: "135deg".to_string(),
            background_image: String::new(),
            background_overlay: false,
            overlay_color: "#000000".to_string(),
            overlay_opacity: 0.5,

            button_style: ButtonStyle::Modern,
            button_size: ButtonSize::Medium,
            border_radius: 8,

            alignment: Alignment::Center,
            padding: Padding::Large,
            max_width: "600px".to_string(),
            shadow: Shadow::Medium,
            font_family: "Inter, system-ui, sans-serif".to_string(),

            show_date_picker: true,
            show_time_picker: true,
            show_guest_count: true,
            show_special_requests: true,
            form_layout: FormLayout::Stacked,
            max_guests: 20,

            enable_recaptcha: false,
            recaptcha_site_key: String::new(),
            recaptcha_secret_key: String::new(),
            recaptcha_threshold: 0.5,
            recaptcha_action: "reservation".to_string(),

            enable_email_notifications: false,
            email_provider: EmailProvider::Simple,
            notification_emails: Vec::new(),
            email_subject: "New Table Reservation".to_string(),
            email_template: "New reservation from {{name}} ({{email}}, {{phone}}) for \
                             {{guests}} guests on {{date}} at {{time}}.\n\
                             Special requests: {{requests}}"
                .to_string(),
            confirmation_email: true,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
            smtp_secure: true,
            smtp_from_email: String::new(),
            smtp_from_name: String::new(),
        }
    }
}

impl Settings {
    /// Merge a JSON object of changed keys into a copy of these settings.
    ///
    /// This is the editor's "update one control" operation. Keys are the
    /// camelCase field names. The receiver is never modified; on error no
    /// partial change is visible.
    pub fn apply_patch(&self, patch: &serde_json::Value) -> Result<Settings, CoreError> {
        let changes = patch
            .as_object()
            .ok_or_else(|| CoreError::Validation("Settings patch must be a JSON object".into()))?;

        let mut merged = serde_json::to_value(self)
            .map_err(|e| CoreError::Internal(format!("Settings serialization failed: {e}")))?;
        if let Some(target) = merged.as_object_mut() {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }

        serde_json::from_value(merged)
            .map_err(|e| CoreError::Validation(format!("Invalid settings patch: {e}")))
    }

    /// Check input-widget constraints (ranges, color and length formats,
    /// recipient addresses). All violations are reported in one message.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut problems = Vec::new();

        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            problems.push("overlayOpacity must be between 0 and 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.recaptcha_threshold) {
            problems.push("recaptchaThreshold must be between 0 and 1".to_string());
        }
        if self.border_radius > MAX_BORDER_RADIUS {
            problems.push(format!("borderRadius must be at most {MAX_BORDER_RADIUS}"));
        }
        if self.max_guests == 0 || self.max_guests > MAX_GUESTS_LIMIT {
            problems.push(format!("maxGuests must be between 1 and {MAX_GUESTS_LIMIT}"));
        }
        if !is_css_length(&self.max_width) {
            problems.push(format!("maxWidth '{}' is not a CSS length", self.max_width));
        }

        let colors = [
            ("titleColor", &self.title_color),
            ("subtitleColor", &self.subtitle_color),
            ("buttonColor", &self.button_color),
            ("buttonTextColor", &self.button_text_color),
            ("backgroundColor", &self.background_color),
            ("gradientStart", &self.gradient_start),
            ("gradientEnd", &self.gradient_end),
            ("overlayColor", &self.overlay_color),
        ];
        for (name, value) in colors {
            if !is_hex_color(value) {
                problems.push(format!("{name} '{value}' is not a hex color"));
            }
        }

        for address in &self.notification_emails {
            if !address.validate_email() {
                problems.push(format!("notificationEmails entry '{address}' is not a valid email"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(problems.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Editor control groups
// ---------------------------------------------------------------------------

/// One collapsible panel in the customization editor.
#[derive(Debug, Clone, Serialize)]
pub struct ControlGroup {
    pub id: &'static str,
    pub label: &'static str,
    /// camelCase settings keys bound to controls in this group.
    pub fields: &'static [&'static str],
}

const GROUPS: &[ControlGroup] = &[
    ControlGroup {
        id: "content",
        label: "Content",
        fields: &["title", "subtitle", "buttonText"],
    },
    ControlGroup {
        id: "colors",
        label: "Colors",
        fields: &["titleColor", "subtitleColor", "buttonColor", "buttonTextColor"],
    },
    ControlGroup {
        id: "background",
        label: "Background",
        fields: &[
            "backgroundType",
            "backgroundColor",
            "gradientStart",
            "gradientEnd",
            "gradientDirection",
            "backgroundImage",
            "backgroundOverlay",
            "overlayColor",
            "overlayOpacity",
        ],
    },
    ControlGroup {
        id: "button",
        label: "Button",
        fields: &["buttonStyle", "buttonSize", "borderRadius"],
    },
    ControlGroup {
        id: "layout",
        label: "Layout",
        fields: &["alignment", "padding", "maxWidth", "shadow", "fontFamily"],
    },
    ControlGroup {
        id: "form",
        label: "Form Fields",
        fields: &[
            "showDatePicker",
            "showTimePicker",
            "showGuestCount",
            "showSpecialRequests",
            "formLayout",
            "maxGuests",
        ],
    },
    ControlGroup {
        id: "recaptcha",
        label: "Spam Protection",
        fields: &[
            "enableRecaptcha",
            "recaptchaSiteKey",
            "recaptchaSecretKey",
            "recaptchaThreshold",
            "recaptchaAction",
        ],
    },
    ControlGroup {
        id: "email",
        label: "Email Notifications",
        fields: &[
            "enableEmailNotifications",
            "emailProvider",
            "notificationEmails",
            "emailSubject",
            "emailTemplate",
            "confirmationEmail",
            "smtpHost",
            "smtpPort",
            "smtpUser",
            "smtpPassword",
            "smtpSecure",
            "smtpFromEmail",
            "smtpFromName",
        ],
    },
];

/// The grouped control catalog the editor renders.
pub fn editor_groups() -> &'static [ControlGroup] {
    GROUPS
}
