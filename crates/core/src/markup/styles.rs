//! Enum-to-CSS lookup tables and the widget stylesheet.

use crate::settings::{
    Alignment, BackgroundType, ButtonSize, ButtonStyle, FormLayout, Padding, Settings, Shadow,
};

use super::escape::{css_url, css_value};

pub fn shadow_rule(shadow: Shadow) -> &'static str {
    match shadow {
        Shadow::None => "none",
        Shadow::Small => "0 1px 3px rgba(0, 0, 0, 0.12)",
        Shadow::Medium => "0 4px 12px rgba(0, 0, 0, 0.1)",
        Shadow::Large => "0 10px 25px rgba(0, 0, 0, 0.15)",
        Shadow::Xlarge => "0 20px 50px rgba(0, 0, 0, 0.25)",
    }
}

pub fn padding_px(padding: Padding) -> u32 {
    match padding {
        Padding::Small => 16,
        Padding::Medium => 24,
        Padding::Large => 32,
        Padding::Xlarge => 48,
    }
}

/// `(padding, font-size)` for the submit button.
pub fn button_size_rule(size: ButtonSize) -> (&'static str, &'static str) {
    match size {
        ButtonSize::Small => ("8px 16px", "14px"),
        ButtonSize::Medium => ("12px 24px", "16px"),
        ButtonSize::Large => ("16px 32px", "18px"),
    }
}

/// Border and background declarations for the submit button.
pub fn button_style_rule(settings: &Settings) -> String {
    let color = css_value(&settings.button_color);
    let text = css_value(&settings.button_text_color);
    match settings.button_style {
        ButtonStyle::Modern => format!(
            "background: {color}; color: {text}; border: none; \
             box-shadow: 0 4px 14px rgba(0, 0, 0, 0.15);"
        ),
        ButtonStyle::Classic => format!(
            "background: {color}; color: {text}; border: 2px solid {color}; \
             text-transform: uppercase; letter-spacing: 0.05em;"
        ),
        ButtonStyle::Minimal => format!(
            "background: transparent; color: {color}; border: none; \
             text-decoration: underline;"
        ),
        ButtonStyle::Gradient => format!(
            "background: linear-gradient(135deg, {}, {}); color: {text}; border: none;",
            css_value(&settings.gradient_start),
            css_value(&settings.gradient_end),
        ),
        ButtonStyle::Outline => {
            format!("background: transparent; color: {color}; border: 2px solid {color};")
        }
    }
}

/// `(text-align, margin)` for the widget card.
pub fn alignment_rule(alignment: Alignment) -> (&'static str, &'static str) {
    match alignment {
        Alignment::Left => ("left", "0 auto 0 0"),
        Alignment::Center => ("center", "0 auto"),
        Alignment::Right => ("right", "0 0 0 auto"),
    }
}

pub fn form_layout_rule(layout: FormLayout) -> &'static str {
    match layout {
        FormLayout::Inline => "display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-end;",
        FormLayout::Stacked => "display: flex; flex-direction: column; gap: 16px;",
        FormLayout::Grid => {
            "display: grid; grid-template-columns: repeat(2, minmax(0, 1fr)); gap: 16px;"
        }
    }
}

/// Background declarations for the widget card. An image background with
/// no URL falls back to the flat color.
pub fn background_rule(settings: &Settings) -> String {
    match settings.background_type {
        BackgroundType::Image if !settings.background_image.trim().is_empty() => format!(
            "background-color: {}; background-image: url({}); \
             background-size: cover; background-position: center;",
            css_value(&settings.background_color),
            css_url(settings.background_image.trim()),
        ),
        BackgroundType::Gradient => format!(
            "background: linear-gradient({}, {}, {});",
            css_value(&settings.gradient_direction),
            css_value(&settings.gradient_start),
            css_value(&settings.gradient_end),
        ),
        _ => format!("background-color: {};", css_value(&settings.background_color)),
    }
}

/// The complete `<style>` block for one widget.
pub fn stylesheet(settings: &Settings) -> String {
    let (text_align, margin) = alignment_rule(settings.alignment);
    let (button_padding, button_font) = button_size_rule(settings.button_size);
    let radius = settings.border_radius;
    let field_width = match settings.form_layout {
        FormLayout::Inline => "flex: 1 1 160px;",
        _ => "",
    };

    let mut css = String::new();
    css.push_str("<style>\n");
    css.push_str(&format!(
        ".trb-widget {{ position: relative; overflow: hidden; box-sizing: border-box; \
         max-width: {}; margin: {margin}; padding: {}px; border-radius: {radius}px; \
         box-shadow: {}; font-family: {}; text-align: {text_align}; {} }}\n",
        css_value(&settings.max_width),
        padding_px(settings.padding),
        shadow_rule(settings.shadow),
        css_value(&settings.font_family),
        background_rule(settings),
    ));
    css.push_str(".trb-content { position: relative; z-index: 1; }\n");
    css.push_str(&format!(
        ".trb-title {{ margin: 0 0 8px; font-size: 28px; font-weight: 700; color: {}; }}\n",
        css_value(&settings.title_color),
    ));
    css.push_str(&format!(
        ".trb-subtitle {{ margin: 0 0 24px; font-size: 16px; color: {}; }}\n",
        css_value(&settings.subtitle_color),
    ));
    css.push_str(&format!(
        ".trb-form {{ {} }}\n",
        form_layout_rule(settings.form_layout)
    ));
    css.push_str(&format!(
        ".trb-field {{ display: flex; flex-direction: column; gap: 6px; text-align: left; {field_width} }}\n"
    ));
    css.push_str(".trb-field-wide { grid-column: 1 / -1; }\n");
    css.push_str(&format!(
        ".trb-field label {{ font-size: 14px; font-weight: 500; color: {}; }}\n",
        css_value(&settings.title_color),
    ));
    css.push_str(&format!(
        ".trb-field input, .trb-field select, .trb-field textarea {{ padding: 10px 12px; \
         font: inherit; border: 1px solid #d1d5db; border-radius: {}px; }}\n",
        radius.min(12),
    ));
    css.push_str(&format!(
        ".trb-submit {{ padding: {button_padding}; font-size: {button_font}; font-weight: 600; \
         border-radius: {radius}px; cursor: pointer; {} }}\n",
        button_style_rule(settings),
    ));
    css.push_str(
        ".trb-message { display: none; margin-top: 16px; padding: 12px; border-radius: 6px; \
         background: #ecfdf5; color: #065f46; }\n",
    );
    css.push_str("</style>\n");
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_tables() {
        assert_eq!(shadow_rule(Shadow::None), "none");
        assert_eq!(padding_px(Padding::Xlarge), 48);
        assert_eq!(button_size_rule(ButtonSize::Large), ("16px 32px", "18px"));
        assert_eq!(alignment_rule(Alignment::Right).0, "right");
        assert!(form_layout_rule(FormLayout::Grid).contains("grid-template-columns"));
    }

    #[test]
    fn outline_button_is_transparent_with_border() {
        let settings = Settings {
            button_style: ButtonStyle::Outline,
            button_color: "#ff0000".to_string(),
            ..Settings::default()
        };
        let rule = button_style_rule(&settings);
        assert!(rule.contains("background: transparent"));
        assert!(rule.contains("border: 2px solid #ff0000"));
    }

    #[test]
    fn image_background_without_url_uses_color() {
        let settings = Settings {
            background_type: BackgroundType::Image,
            background_image: "  ".to_string(),
            background_color: "#fafafa".to_string(),
            ..Settings::default()
        };
        assert_eq!(background_rule(&settings), "background-color: #fafafa;");
    }

    #[test]
    fn gradient_background() {
        let settings = Settings {
            background_type: BackgroundType::Gradient,
            ..Settings::default()
        };
        assert_eq!(
            background_rule(&settings),
            "background: linear-gradient(135deg, #667eea, #764ba2);"
        );
    }
}
