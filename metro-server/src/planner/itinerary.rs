//! Itineraries: segmented routes with totals and carbon footprint.

use crate::domain::{Line, PlatformId, ServiceTime, TripId, ceil_to_minute};

use super::path::Criterion;

/// One stop of a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: PlatformId,
    pub name: String,
    /// Ride time from the previous stop; zero for a segment's first stop
    pub duration_secs: u32,
    /// Ride distance from the previous stop
    pub distance_meters: f64,
}

/// A run of stops ridden on one line without changing.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub stops: Vec<Stop>,
    pub line: Line,
    /// Where the train is heading, as shown to riders
    pub direction: String,
    /// Walking and waiting time before boarding. `None` only on the first
    /// segment of an itinerary.
    pub connecting_secs: Option<u32>,
}

impl Segment {
    /// Time spent on the train.
    pub fn ride_secs(&self) -> u32 {
        self.stops.iter().map(|s| s.duration_secs).sum()
    }

    /// Ride time in whole minutes, rounded up.
    pub fn ride_minutes(&self) -> u32 {
        ceil_to_minute(self.ride_secs()) / 60
    }

    pub fn distance_meters(&self) -> f64 {
        self.stops.iter().map(|s| s.distance_meters).sum()
    }

    pub fn first_stop(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn last_stop(&self) -> Option<&Stop> {
        self.stops.last()
    }
}

/// A route from origin to destination, before schedule binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub segments: Vec<Segment>,
    pub criterion: Criterion,
    /// Grams of CO2e for the whole journey
    pub carbon_grams: f64,
}

impl Itinerary {
    /// Assemble an itinerary, computing its carbon footprint.
    pub fn new(segments: Vec<Segment>, criterion: Criterion, grams_per_km: f64) -> Self {
        let distance_km: f64 = segments.iter().map(Segment::distance_meters).sum::<f64>() / 1000.0;
        Self {
            segments,
            criterion,
            carbon_grams: distance_km * grams_per_km,
        }
    }

    /// Riding plus connecting time.
    pub fn total_duration_secs(&self) -> u32 {
        self.segments
            .iter()
            .map(|s| s.ride_secs() + s.connecting_secs.unwrap_or(0))
            .sum()
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.segments.iter().map(Segment::distance_meters).sum()
    }

    /// Time spent walking between platforms.
    pub fn walking_secs(&self) -> u32 {
        self.segments
            .iter()
            .map(|s| s.connecting_secs.unwrap_or(0))
            .sum()
    }

    pub fn stop_count(&self) -> usize {
        self.segments.iter().map(|s| s.stops.len()).sum()
    }

    /// Line changes, i.e. one fewer than the number of segments.
    pub fn transfer_count(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

/// The concrete train chosen for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTimes {
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    /// `None` when no train serves the segment at all
    pub trip: Option<TripId>,
}

/// An itinerary with a scheduled departure for every segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedItinerary {
    pub itinerary: Itinerary,
    /// One entry per segment, in order
    pub times: Vec<SegmentTimes>,
}

impl TimedItinerary {
    /// Segments paired with their scheduled times.
    pub fn segments(&self) -> impl Iterator<Item = (&Segment, &SegmentTimes)> {
        self.itinerary.segments.iter().zip(&self.times)
    }

    /// Departure of the first train.
    pub fn departure(&self) -> Option<ServiceTime> {
        self.times.first().map(|t| t.departure)
    }

    /// Arrival of the last train.
    pub fn arrival(&self) -> Option<ServiceTime> {
        self.times.last().map(|t| t.arrival)
    }
}
