// @generated by staticbundle. Do not edit by hand.
// Message source `i18n::Messages`.

/// Locales supported by [`Messages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LocaleTag {
    #[default]
    Root,
    Fr,
}

impl LocaleTag {
    pub const ALL: [LocaleTag; 2] = [LocaleTag::Root, LocaleTag::Fr];

    /// The configured tag; empty for the root locale.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocaleTag::Root => "",
            LocaleTag::Fr => "fr",
        }
    }
}

/// Localized messages, see [`LocaleTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Messages {
    locale_tag: LocaleTag,
}

#[allow(non_snake_case)]
impl Messages {
    pub const fn new(locale_tag: LocaleTag) -> Self {
        Self { locale_tag }
    }

    pub const fn locale_tag(&self) -> LocaleTag {
        self.locale_tag
    }

    pub const fn with_locale_tag(&self, locale_tag: LocaleTag) -> Self {
        Self { locale_tag }
    }

    /// Plural form index of `n` in the current locale.
    pub fn plural_form(&self, n: i64) -> i64 {
        match self.locale_tag {
            LocaleTag::Root => plural_form_root(n),
            LocaleTag::Fr => plural_form_fr(n),
        }
    }

    /// Message "greeting".
    pub fn greeting(&self, arg0: &str) -> String {
        match self.locale_tag {
            LocaleTag::Root => format!("Hello {arg0}!"),
            LocaleTag::Fr => format!("Bonjour {arg0} !"),
        }
    }

    /// Message "items".
    pub fn items(&self, amount: i64) -> String {
        match self.locale_tag {
            LocaleTag::Root => match plural_form_root(amount) {
                0 => String::from("One item"),
                _ => String::from("Many items"),
            },
            LocaleTag::Fr => match plural_form_fr(amount) {
                0 => String::from("Un article"),
                _ => String::from("Plusieurs articles"),
            },
        }
    }

    /// Message "farewell".
    pub fn farewell(&self, name: &str, days: i64) -> String {
        match self.locale_tag {
            LocaleTag::Root => format!("Goodbye, {name}. See you in {days} days"),
            LocaleTag::Fr => format!("Goodbye, {name}. See you in {days} days"),
        }
    }
}

fn plural_form_root(n: i64) -> i64 {
    if n == 1 { 0 } else { 1 }
}

fn plural_form_fr(n: i64) -> i64 {
    if n > 1 { 1 } else { 0 }
}
