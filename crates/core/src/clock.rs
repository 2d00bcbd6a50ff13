use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

/// Source of the local wall-clock time used for file names and stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_does_not_move() {
        let at = NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(at));
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }
}
