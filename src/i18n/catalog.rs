// Message catalogs for user-facing text

/// Locale used when the requested one has no catalog
pub const FALLBACK_LOCALE: &str = "en";

/// Looks up user-facing strings for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    locale: &'static str,
}

impl Translator {
    /// Build a translator for `locale`.
    ///
    /// Region suffixes are ignored (`de_DE`, `de-AT` both resolve to `de`) and
    /// locales without a catalog fall back to English.
    pub fn new(locale: &str) -> Self {
        let language = locale
            .split(|c| c == '_' || c == '-')
            .next()
            .unwrap_or(FALLBACK_LOCALE)
            .to_ascii_lowercase();

        let locale = match language.as_str() {
            "de" => "de",
            _ => FALLBACK_LOCALE,
        };

        Self { locale }
    }

    pub fn locale(&self) -> &'static str {
        self.locale
    }

    /// Translate a message key. Unknown keys come back unchanged.
    pub fn get(&self, key: &'static str) -> &'static str {
        let translated = match self.locale {
            "de" => german(key),
            _ => None,
        };

        translated.or_else(|| english(key)).unwrap_or(key)
    }
}

fn english(key: &str) -> Option<&'static str> {
    let text = match key {
        "permission-error" => "You do not have permission to do that.",
        "delete-permission-denied" => "You do not have permission to delete events.",
        "create-permission-denied" => "You do not have permission to add events.",
        "removed-item" => "Removed item",
        "could-not-remove-item" => "Could not remove item",
        "no-items-selected" => "No items selected.",
        "created-item" => "Created item",
        "login-failed" => "Sorry, your username or password is incorrect.",
        "logged-in" => "You are now logged in.",
        "logged-out" => "You have logged out.",
        "not-found" => "The page you requested does not exist.",
        "internal-error" => "An internal error occurred.",
        _ => return None,
    };
    Some(text)
}

fn german(key: &str) -> Option<&'static str> {
    let text = match key {
        "permission-error" => "Dafür fehlt Ihnen die Berechtigung.",
        "delete-permission-denied" => "Sie dürfen keine Termine löschen.",
        "create-permission-denied" => "Sie dürfen keine Termine anlegen.",
        "removed-item" => "Eintrag entfernt",
        "could-not-remove-item" => "Eintrag konnte nicht entfernt werden",
        "no-items-selected" => "Keine Einträge ausgewählt.",
        "created-item" => "Eintrag angelegt",
        "login-failed" => "Benutzername oder Passwort ist falsch.",
        "logged-in" => "Sie sind jetzt angemeldet.",
        "logged-out" => "Sie haben sich abgemeldet.",
        "not-found" => "Die angeforderte Seite existiert nicht.",
        "internal-error" => "Ein interner Fehler ist aufgetreten.",
        _ => return None,
    };
    Some(text)
}
