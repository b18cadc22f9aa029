use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelplineRecord {
    pub intro_text: &'static str,
    pub numbers: &'static [&'static str],
}

impl HelplineRecord {
    pub fn joined_numbers(&self) -> String {
        self.numbers.join("; ")
    }
}

pub const INDIA_HELPLINES: HelplineRecord = HelplineRecord {
    intro_text: "Please reach out for immediate help. India Helplines:",
    numbers: &["Kiran Helpline: 1800-599-0019", "AASRA: +91-22-27546669"],
};

pub const DEFAULT_HELPLINES: HelplineRecord = HelplineRecord {
    intro_text: "Please reach out for immediate help.",
    numbers: &["US/Canada: 988", "UK: 111"],
};

/// Regions with dedicated helpline data. Codes are matched exactly; anything
/// else, including an absent header, is `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
pub enum Region {
    #[strum(serialize = "IND")]
    India,
    #[strum(serialize = "default")]
    Default,
}

impl Region {
    pub fn from_code(code: &str) -> Self {
        code.parse().unwrap_or(Self::Default)
    }

    pub fn helplines(self) -> &'static HelplineRecord {
        match self {
            Self::India => &INDIA_HELPLINES,
            Self::Default => &DEFAULT_HELPLINES,
        }
    }
}
