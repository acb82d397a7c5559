//! Simulated tracker bench: a scripted or physically modelled sensor, a
//! recording motor pair and a simulated clock, all sharing one event log.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use sun_tracker::{ActuatorPort, Axis, Direction, IterationSample, SensorPort, TelemetryPort};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Wait(u32),
    Read(Axis),
    Drive(Axis, Direction, u16),
    Stop(Axis),
}

#[derive(Debug, Default)]
struct AxisModel {
    angle: f32,
    /// Degrees moved per millisecond per unit of speed.
    gain: f32,
    script: VecDeque<f32>,
}

impl AxisModel {
    fn reading(&mut self) -> f32 {
        match self.script.len() {
            0 => self.angle,
            1 => self.script[0],
            _ => self.script.pop_front().unwrap(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    events: Vec<Event>,
    vertical: AxisModel,
    horizontal: AxisModel,
    driving: Option<(Axis, Direction, u16)>,
    fail_reads: bool,
    fail_drives: bool,
    elapsed_ms: u64,
}

impl State {
    fn model(&mut self, axis: Axis) -> &mut AxisModel {
        match axis {
            Axis::Vertical => &mut self.vertical,
            Axis::Horizontal => &mut self.horizontal,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bench(Rc<RefCell<State>>);

impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readings returned one per read; the last one repeats forever.
    pub fn script(self, axis: Axis, readings: &[f32]) -> Self {
        self.0.borrow_mut().model(axis).script = readings.iter().copied().collect();
        self
    }

    /// Unscripted axis that moves `gain * speed` degrees per millisecond of
    /// drive.
    pub fn model(self, axis: Axis, angle: f32, gain: f32) -> Self {
        {
            let mut state = self.0.borrow_mut();
            let model = state.model(axis);
            model.angle = angle;
            model.gain = gain;
        }
        self
    }

    pub fn failing_reads(self) -> Self {
        self.0.borrow_mut().fail_reads = true;
        self
    }

    pub fn failing_drives(self) -> Self {
        self.0.borrow_mut().fail_drives = true;
        self
    }

    pub fn sensor(&self) -> BenchSensor {
        BenchSensor(self.0.clone())
    }

    pub fn motors(&self) -> BenchMotors {
        BenchMotors(self.0.clone())
    }

    pub fn clock(&self) -> BenchClock {
        BenchClock(self.0.clone())
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub fn angle(&self, axis: Axis) -> f32 {
        self.0.borrow_mut().model(axis).angle
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.0.borrow().elapsed_ms
    }

    pub fn drives(&self) -> Vec<(Axis, Direction, u16)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Drive(axis, direction, speed) => Some((axis, direction, speed)),
                _ => None,
            })
            .collect()
    }

    pub fn stops(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Stop(_)))
            .count()
    }

    pub fn reads(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Read(_)))
            .count()
    }
}

pub struct BenchSensor(Rc<RefCell<State>>);

impl SensorPort for BenchSensor {
    type Error = &'static str;

    fn read_angle(&mut self, axis: Axis) -> Result<f32, Self::Error> {
        let mut state = self.0.borrow_mut();
        state.events.push(Event::Read(axis));
        if state.fail_reads {
            return Err("bus timeout");
        }
        Ok(state.model(axis).reading())
    }
}

pub struct BenchMotors(Rc<RefCell<State>>);

impl ActuatorPort for BenchMotors {
    type Error = &'static str;

    fn drive(&mut self, axis: Axis, direction: Direction, speed: u16) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        state.events.push(Event::Drive(axis, direction, speed));
        if state.fail_drives {
            return Err("driver fault");
        }
        state.driving = Some((axis, direction, speed));
        Ok(())
    }

    fn stop(&mut self, axis: Axis) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        state.events.push(Event::Stop(axis));
        state.driving = None;
        Ok(())
    }
}

pub struct BenchClock(Rc<RefCell<State>>);

impl BenchClock {
    fn advance(&mut self, ms: u32) {
        let mut state = self.0.borrow_mut();
        state.events.push(Event::Wait(ms));
        state.elapsed_ms += u64::from(ms);

        let driving = state.driving;
        if let Some((axis, direction, speed)) = driving {
            let model = state.model(axis);
            let moved = model.gain * f32::from(speed) * ms as f32;
            match direction {
                Direction::Clockwise => model.angle += moved,
                Direction::CounterClockwise => model.angle -= moved,
            }
        }
    }
}

impl DelayNs for BenchClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns / 1_000_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(us / 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

/// Keeps every sample it is handed.
#[derive(Debug, Default)]
pub struct Samples(pub Vec<IterationSample>);

impl TelemetryPort for Samples {
    fn emit(&mut self, sample: &IterationSample) {
        self.0.push(*sample);
    }
}
