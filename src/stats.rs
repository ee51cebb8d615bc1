use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::QuakeRecord;

/// Magnitude at or above which an event counts as strong.
pub const STRONG_MAGNITUDE: f64 = 4.5;

/// Half-open magnitude ranges. A value on a boundary belongs to the upper range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnitudeBucket {
    Under45,
    Mag45To5,
    Mag5To6,
    Mag6To7,
    Mag7Plus,
}

impl MagnitudeBucket {
    pub const ALL: [MagnitudeBucket; 5] = [
        MagnitudeBucket::Under45,
        MagnitudeBucket::Mag45To5,
        MagnitudeBucket::Mag5To6,
        MagnitudeBucket::Mag6To7,
        MagnitudeBucket::Mag7Plus,
    ];

    pub fn classify(magnitude: f64) -> Self {
        match magnitude {
            m if m < 4.5 => MagnitudeBucket::Under45,
            m if m < 5.0 => MagnitudeBucket::Mag45To5,
            m if m < 6.0 => MagnitudeBucket::Mag5To6,
            m if m < 7.0 => MagnitudeBucket::Mag6To7,
            _ => MagnitudeBucket::Mag7Plus,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            MagnitudeBucket::Under45 => "<4.5",
            MagnitudeBucket::Mag45To5 => "4.5-5",
            MagnitudeBucket::Mag5To6 => "5-6",
            MagnitudeBucket::Mag6To7 => "6-7",
            MagnitudeBucket::Mag7Plus => "7+",
        }
    }
}

/// Per-bucket counts, indexed in [`MagnitudeBucket::ALL`] order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Histogram(pub [usize; 5]);

impl Histogram {
    pub fn add(&mut self, magnitude: f64) {
        self.0[MagnitudeBucket::classify(magnitude).index()] += 1;
    }

    pub fn count(&self, bucket: MagnitudeBucket) -> usize {
        self.0[bucket.index()]
    }

    pub fn sum(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn max(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

/// Statistics over the records that passed the filter in one refresh.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub timestamp: DateTime<Utc>,
    pub total: usize,
    pub strong: usize,
    pub histogram: Histogram,
}

impl Summary {
    /// Builds a summary from already-filtered records. Always a full recount.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a QuakeRecord>,
    {
        let mut s = Summary {
            timestamp: Utc::now(),
            ..Default::default()
        };

        for r in records {
            let magnitude = r.magnitude_value();
            s.total += 1;

            if magnitude >= STRONG_MAGNITUDE {
                s.strong += 1;
            }

            s.histogram.add(magnitude);
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn strong_pct(&self) -> f64 {
        Self::pct(self.strong, self.total)
    }
}
