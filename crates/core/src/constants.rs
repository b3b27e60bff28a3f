/// Aggregate (all accounts) scope ID
pub const PORTFOLIO_TOTAL_ACCOUNT_ID: &str = "TOTAL";

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Consolidated ID shared by chart entries that overflow the color palette
pub const OTHER_CONSOLIDATED_ID: &str = "OTHER";

/// Display name of the consolidated chart entry
pub const OTHER_CONSOLIDATED_NAME: &str = "Other";

/// Color of the consolidated chart entry
pub const OTHER_CONSOLIDATED_COLOR: &str = "#878580";

/// Label shown when merged rows disagree on an update date
pub const MULTI_DATE_LABEL: &str = "Multi";

/// Default chart palette
pub const DEFAULT_CHART_COLORS: [&str; 8] = [
    "#4385be", "#879a39", "#da702c", "#8b7ec8", "#d14d41", "#3aa99f", "#d0a215", "#ce5d97",
];

/// Number of calendar months in a ledger year
pub const MONTHS_PER_YEAR: u32 = 12;
