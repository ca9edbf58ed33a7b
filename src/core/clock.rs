//! Time source for the session timer

/// Wall-clock milliseconds, the same scale as `Date.now()`.
pub trait Clock {
    fn now_millis(&self) -> f64;
}

/// Real clock backed by [`crate::time::now_millis`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        crate::time::now_millis()
    }
}

/// Hand-driven clock for simulating elapsed time (and skew) in tests.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<f64>>);

#[cfg(test)]
impl ManualClock {
    pub fn at(millis: f64) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(millis)))
    }

    pub fn advance_millis(&self, millis: f64) {
        self.0.set(self.0.get() + millis);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance_millis(secs * 1000.0);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_millis(&self) -> f64 {
        self.0.get()
    }
}
