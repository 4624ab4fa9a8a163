//! Reservation form markup.
//!
//! Name, email and phone are always rendered. Date, time, guest count and
//! special requests are rendered once each when their toggle is on and not
//! at all otherwise.

use crate::settings::{Settings, MAX_GUESTS_LIMIT};

use super::escape::html;
use super::{FORM_ID, MESSAGE_ID};

/// `name` attribute of every input the form can contain, in render order.
pub const FIELD_DATE: &str = "date";
pub const FIELD_TIME: &str = "time";
pub const FIELD_GUESTS: &str = "guests";
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_REQUESTS: &str = "requests";

fn input(out: &mut String, kind: &str, name: &str, label: &str, required: bool) {
    out.push_str("      <div class=\"trb-field\">\n");
    out.push_str(&format!(
        "        <label for=\"trb-{name}\">{label}</label>\n"
    ));
    out.push_str(&format!(
        "        <input type=\"{kind}\" id=\"trb-{name}\" name=\"{name}\"{}>\n",
        if required { " required" } else { "" }
    ));
    out.push_str("      </div>\n");
}

fn guest_select(out: &mut String, max_guests: u32) {
    out.push_str("      <div class=\"trb-field\">\n");
    out.push_str(&format!(
        "        <label for=\"trb-{FIELD_GUESTS}\">Guests</label>\n"
    ));
    out.push_str(&format!(
        "        <select id=\"trb-{FIELD_GUESTS}\" name=\"{FIELD_GUESTS}\" required>\n"
    ));
    for count in 1..=max_guests.clamp(1, MAX_GUESTS_LIMIT) {
        let label = if count == 1 { "Guest" } else { "Guests" };
        out.push_str(&format!(
            "          <option value=\"{count}\">{count} {label}</option>\n"
        ));
    }
    out.push_str("        </select>\n");
    out.push_str("      </div>\n");
}

fn requests_textarea(out: &mut String) {
    out.push_str("      <div class=\"trb-field trb-field-wide\">\n");
    out.push_str(&format!(
        "        <label for=\"trb-{FIELD_REQUESTS}\">Special Requests</label>\n"
    ));
    out.push_str(&format!(
        "        <textarea id=\"trb-{FIELD_REQUESTS}\" name=\"{FIELD_REQUESTS}\" rows=\"3\"></textarea>\n"
    ));
    out.push_str("      </div>\n");
}

/// Render the `<form>` element, the submit button and the status message.
pub fn form(settings: &Settings) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "    <form class=\"trb-form\" id=\"{FORM_ID}\">\n"
    ));

    if settings.show_date_picker {
        input(&mut out, "date", FIELD_DATE, "Date", true);
    }
    if settings.show_time_picker {
        input(&mut out, "time", FIELD_TIME, "Time", true);
    }
    if settings.show_guest_count {
        guest_select(&mut out, settings.max_guests);
    }
    input(&mut out, "text", FIELD_NAME, "Name", true);
    input(&mut out, "email", FIELD_EMAIL, "Email", true);
    input(&mut out, "tel", FIELD_PHONE, "Phone", true);
    if settings.show_special_requests {
        requests_textarea(&mut out);
    }

    out.push_str("      <div class=\"trb-field trb-field-wide\">\n");
    out.push_str(&format!(
        "        <button type=\"submit\" class=\"trb-submit\">{}</button>\n",
        html(&settings.button_text)
    ));
    out.push_str("      </div>\n");
    out.push_str("    </form>\n");
    out.push_str(&format!(
        "    <div class=\"trb-message\" id=\"{MESSAGE_ID}\" role=\"status\"></div>\n"
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, name: &str) -> usize {
        haystack.matches(&format!("name=\"{name}\"")).count()
    }

    #[test]
    fn guest_options_follow_max_guests() {
        let settings = Settings {
            max_guests: 3,
            ..Settings::default()
        };
        let out = form(&settings);
        assert!(out.contains("<option value=\"1\">1 Guest</option>"));
        assert!(out.contains("<option value=\"3\">3 Guests</option>"));
        assert!(!out.contains("<option value=\"4\">"));
    }

    #[test]
    fn contact_fields_always_present() {
        let settings = Settings {
            show_date_picker: false,
            show_time_picker: false,
            show_guest_count: false,
            show_special_requests: false,
            ..Settings::default()
        };
        let out = form(&settings);
        for name in [FIELD_NAME, FIELD_EMAIL, FIELD_PHONE] {
            assert_eq!(count(&out, name), 1, "{name}");
        }
        for name in [FIELD_DATE, FIELD_TIME, FIELD_GUESTS, FIELD_REQUESTS] {
            assert_eq!(count(&out, name), 0, "{name}");
        }
    }

    #[test]
    fn button_label_is_escaped() {
        let settings = Settings {
            button_text: "Book <now>".to_string(),
            ..Settings::default()
        };
        assert!(form(&settings).contains(">Book &lt;now&gt;</button>"));
    }
}
