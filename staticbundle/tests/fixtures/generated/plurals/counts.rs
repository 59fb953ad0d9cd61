// @generated by staticbundle. Do not edit by hand.
// Message source `plurals::Counts`.

/// Locales supported by [`Counts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LocaleTag {
    #[default]
    Root,
    Ru,
    Cs,
}

impl LocaleTag {
    pub const ALL: [LocaleTag; 3] = [LocaleTag::Root, LocaleTag::Ru, LocaleTag::Cs];

    /// The configured tag; empty for the root locale.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocaleTag::Root => "",
            LocaleTag::Ru => "ru",
            LocaleTag::Cs => "cs",
        }
    }
}

/// Localized messages, see [`LocaleTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Counts {
    locale_tag: LocaleTag,
}

#[allow(non_snake_case)]
impl Counts {
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
            LocaleTag::Ru => plural_form_ru(n),
            LocaleTag::Cs => plural_form_cs(n),
        }
    }

    /// Message "file.count".
    pub fn fileCount(&self, amount: i64) -> String {
        match self.locale_tag {
            LocaleTag::Root => match plural_form_root(amount) {
                0 => String::from("One file"),
                _ => String::from("Many files"),
            },
            LocaleTag::Ru => match plural_form_ru(amount) {
                0 => String::from("файл"),
                1 => String::from("файла"),
                _ => String::from("файлов"),
            },
            LocaleTag::Cs => match plural_form_cs(amount) {
                0 => String::from("soubor"),
                1 => String::from("soubory"),
                _ => String::from("souborů"),
            },
        }
    }

    /// Message "title".
    pub fn title(&self) -> String {
        match self.locale_tag {
            LocaleTag::Root => String::from("Files"),
            LocaleTag::Ru => String::from("Файлы"),
            LocaleTag::Cs => String::from("Files"),
        }
    }
}

fn plural_form_root(n: i64) -> i64 {
    if n != 1 { 1 } else { 0 }
}

fn plural_form_ru(n: i64) -> i64 {
    if ((n % 10) == 1) && ((n % 100) != 11) { 0 } else { if (((n % 10) >= 2) && ((n % 10) <= 4)) && (((n % 100) < 10) || ((n % 100) >= 20)) { 1 } else { 2 } }
}

fn plural_form_cs(n: i64) -> i64 {
    if (i64::checked_rem(n, if n > 100 { 100 } else { 10 }).unwrap_or(0)) == 1 { 0 } else { if (n >= 2) && (n <= 4) { 1 } else { 2 } }
}
