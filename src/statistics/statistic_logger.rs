use std::fmt::Display;

use itertools::Itertools;

use super::statistic_logging::log_statistic;

/// Logs statistics under a name prefix, so that the counters of nested components end up with
/// distinguishable names.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new<Input: IntoIterator<Item = impl Display>>(name_prefix: Input) -> Self {
        Self {
            name_prefix: name_prefix.into_iter().join("_"),
        }
    }

    /// Extends the stored prefix and returns a new [`StatisticLogger`] for the nested scope.
    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        Self {
            name_prefix: format!("{}_{}", self.name_prefix, addition_to_prefix),
        }
    }

    pub fn log_statistic(&self, name: impl Display, value: impl Display) {
        if self.name_prefix.is_empty() {
            log_statistic(name, value);
        } else {
            log_statistic(format!("{}_{name}", self.name_prefix), value);
        }
    }
}
