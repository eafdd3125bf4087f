//! Per-frame slide animation
//!
//! Moves a vehicle's head linearly from where the slide started to its target
//! over a fixed duration and hands the slide ticket back once, when the target
//! is reached.

use std::collections::HashMap;

use super::types::{Position, VehicleId, DEFAULT_SLIDE_DURATION};
use super::vehicle::SlideTicket;

#[derive(Debug)]
struct Slide {
    ticket: SlideTicket,
    start: Position,
    target: Position,
    elapsed: f32,
}

impl Slide {
    fn position(&self, duration: f32) -> Position {
        if duration <= 0.0 {
            return self.target;
        }
        let t = (self.elapsed / duration).clamp(0.0, 1.0);
        self.start.lerp(&self.target, t)
    }
}

/// A slide that reached its target this frame
#[derive(Debug)]
pub struct FinishedSlide {
    pub ticket: SlideTicket,
    pub position: Position,
}

/// Built-in animator driving every in-flight slide
#[derive(Debug)]
pub struct SlideAnimator {
    duration: f32,
    slides: HashMap<VehicleId, Slide>,
}

impl Default for SlideAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_SLIDE_DURATION)
    }
}

impl SlideAnimator {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            slides: HashMap::new(),
        }
    }

    /// Start animating towards `target`, taking ownership of the ticket
    ///
    /// A second call for the same vehicle replaces the first slide and drops
    /// its ticket unfinished.
    pub fn move_to(&mut self, ticket: SlideTicket, start: Position, target: Position) {
        let vehicle = ticket.vehicle();
        self.slides.insert(
            vehicle,
            Slide {
                ticket,
                start,
                target,
                elapsed: 0.0,
            },
        );
    }

    /// Advance every slide by one frame
    ///
    /// Finished slides are returned in vehicle order so callers settle them
    /// deterministically.
    pub fn advance(&mut self, delta_secs: f32) -> Vec<FinishedSlide> {
        let duration = self.duration;
        let mut done: Vec<VehicleId> = Vec::new();
        for (vehicle, slide) in self.slides.iter_mut() {
            slide.elapsed += delta_secs;
            if slide.elapsed >= duration {
                done.push(*vehicle);
            }
        }
        done.sort();

        done.into_iter()
            .filter_map(|vehicle| self.slides.remove(&vehicle))
            .map(|slide| FinishedSlide {
                position: slide.target,
                ticket: slide.ticket,
            })
            .collect()
    }

    /// Current interpolated head position of a sliding vehicle
    pub fn position_of(&self, vehicle: VehicleId) -> Option<Position> {
        self.slides
            .get(&vehicle)
            .map(|slide| slide.position(self.duration))
    }

    pub fn positions(&self) -> impl Iterator<Item = (VehicleId, Position)> + '_ {
        self.slides
            .iter()
            .map(move |(vehicle, slide)| (*vehicle, slide.position(self.duration)))
    }

    /// Stop a slide where it is, discarding its ticket
    pub fn cancel(&mut self, vehicle: VehicleId) -> Option<Position> {
        self.slides
            .remove(&vehicle)
            .map(|slide| slide.position(self.duration))
    }

    pub fn is_animating(&self, vehicle: VehicleId) -> bool {
        self.slides.contains_key(&vehicle)
    }
}
