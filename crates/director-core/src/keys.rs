//! Key display names for the keystroke overlay.
//!
//! Maps macOS virtual key codes to readable names, renders modifier glyphs
//! in the conventional ⌃⌥⇧⌘ order, and recovers printable letters from the
//! control characters a keyboard tap reports while Command is held.

use reframe_project_model::event::Modifiers;

/// Key code of the recording-stop hotkey (⌘⇧2 on the default layout).
pub const STOP_HOTKEY_KEY_CODE: u16 = 19;

/// Resolve the display name for a key, or `None` for standalone modifiers
/// and keys with no printable representation.
pub fn key_display_name(key_code: u16, character: Option<&str>) -> Option<String> {
    let name = match key_code {
        36 => "Return",
        76 => "Enter",
        48 => "Tab",
        49 => "Space",
        51 => "Delete",
        117 => "⌦",
        53 => "Escape",
        123 => "←",
        124 => "→",
        125 => "↓",
        126 => "↑",
        115 => "Home",
        119 => "End",
        116 => "Page Up",
        121 => "Page Down",
        122 => "F1",
        120 => "F2",
        99 => "F3",
        118 => "F4",
        96 => "F5",
        97 => "F6",
        98 => "F7",
        100 => "F8",
        101 => "F9",
        109 => "F10",
        103 => "F11",
        111 => "F12",
        // Standalone modifier keys never render on their own.
        54..=63 => return None,
        _ => return character.and_then(printable_name),
    };
    Some(name.to_string())
}

/// Modifier glyphs in fixed ⌃⌥⇧⌘ order.
pub fn modifier_glyphs(modifiers: &Modifiers) -> String {
    let mut glyphs = String::new();
    if modifiers.control {
        glyphs.push('⌃');
    }
    if modifiers.option {
        glyphs.push('⌥');
    }
    if modifiers.shift {
        glyphs.push('⇧');
    }
    if modifiers.command {
        glyphs.push('⌘');
    }
    glyphs
}

/// Printable form of a reported character. Control characters U+0001–U+001A
/// map back to the letter the user pressed (the tap reports ⌘C as U+0003).
fn printable_name(character: &str) -> Option<String> {
    let first = character.chars().next()?;
    let code = first as u32;
    if (0x01..=0x1A).contains(&code) {
        let letter = char::from_u32('A' as u32 + code - 1)?;
        return Some(letter.to_string());
    }
    if first.is_control() || character.trim().is_empty() {
        return None;
    }
    Some(character.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_key_names() {
        assert_eq!(key_display_name(36, None).as_deref(), Some("Return"));
        assert_eq!(key_display_name(48, None).as_deref(), Some("Tab"));
        assert_eq!(key_display_name(49, None).as_deref(), Some("Space"));
        assert_eq!(key_display_name(53, None).as_deref(), Some("Escape"));
        assert_eq!(key_display_name(123, None).as_deref(), Some("←"));
        assert_eq!(key_display_name(126, None).as_deref(), Some("↑"));
        assert_eq!(key_display_name(122, None).as_deref(), Some("F1"));
        assert_eq!(key_display_name(111, None).as_deref(), Some("F12"));
        assert_eq!(key_display_name(115, None).as_deref(), Some("Home"));
        assert_eq!(key_display_name(121, None).as_deref(), Some("Page Down"));
    }

    #[test]
    fn test_standalone_modifiers_render_nothing() {
        for code in 54..=63 {
            assert_eq!(key_display_name(code, Some("x")), None);
        }
    }

    #[test]
    fn test_character_fallback_uppercases() {
        assert_eq!(key_display_name(0, Some("a")).as_deref(), Some("A"));
        assert_eq!(key_display_name(0, Some("7")).as_deref(), Some("7"));
        assert_eq!(key_display_name(0, None), None);
        assert_eq!(key_display_name(0, Some("")), None);
    }

    #[test]
    fn test_control_character_recovery() {
        // ⌘C reports U+0003 (ETX).
        assert_eq!(key_display_name(8, Some("\u{3}")).as_deref(), Some("C"));
        // U+0001 -> A, U+001A -> Z.
        assert_eq!(key_display_name(0, Some("\u{1}")).as_deref(), Some("A"));
        assert_eq!(key_display_name(6, Some("\u{1a}")).as_deref(), Some("Z"));
    }

    #[test]
    fn test_modifier_glyph_order() {
        let all = Modifiers {
            command: true,
            shift: true,
            option: true,
            control: true,
        };
        assert_eq!(modifier_glyphs(&all), "⌃⌥⇧⌘");

        let cmd_shift = Modifiers {
            command: true,
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(modifier_glyphs(&cmd_shift), "⇧⌘");
        assert_eq!(modifier_glyphs(&Modifiers::NONE), "");
    }
}
