/// Which end of the working day a checklist covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftKind {
    Opening,
    Closing,
}

pub const OPENING_TASKS: &[&str] = &[
    "☕ Turn on the espresso machine and let it warm up",
    "🥛 Check the milk supply",
    "🍬 Check the syrup supply",
    "🧼 Turn on the dishwasher",
    "🍰 Lay out products in the display case",
    "💰 Check the till (change, receipt roll)",
    "🧹 Quick clean of the work area",
    "🚪 Unlock the front door",
];

pub const CLOSING_TASKS: &[&str] = &[
    "☕ Turn off and clean the espresso machine",
    "🧽 Wash equipment (grinder, pitchers)",
    "🍰 Move display products to the fridge",
    "🧼 Turn off the dishwasher",
    "💰 Cash out the till and close the shift",
    "🗑 Take out the trash",
    "💡 Turn off the lights",
    "🔒 Lock the front door",
];

impl ShiftKind {
    pub const ALL: [ShiftKind; 2] = [ShiftKind::Opening, ShiftKind::Closing];

    /// The immutable task list for this shift.
    pub fn template(self) -> &'static [&'static str] {
        match self {
            Self::Opening => OPENING_TASKS,
            Self::Closing => CLOSING_TASKS,
        }
    }

    /// Label of the persistent menu button that selects this shift.
    pub fn menu_label(self) -> &'static str {
        match self {
            Self::Opening => "🚀 Opening shift",
            Self::Closing => "🔚 Closing shift",
        }
    }

    /// Lowercase noun used in the checklist header.
    pub fn title(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Closing => "closing",
        }
    }

    /// Matches menu button text (or anything typed that names the shift).
    pub fn from_menu_text(text: &str) -> Option<Self> {
        if text.contains("Opening") {
            Some(Self::Opening)
        } else if text.contains("Closing") {
            Some(Self::Closing)
        } else {
            None
        }
    }

    /// Owned snapshot of the template for a new session.
    pub fn snapshot(self) -> Vec<String> {
        self.template().iter().map(|task| (*task).to_string()).collect()
    }
}
