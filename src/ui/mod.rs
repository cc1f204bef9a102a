pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, note, section, success, summary_row, usage, warn};
pub use table::{primary_table, secondary_table, stats_table};
pub use theme::{theme, Theme};
