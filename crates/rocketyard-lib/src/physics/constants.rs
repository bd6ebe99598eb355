//! Reference-body constants. Each one is a default for [`crate::config::ReferenceBody`].

/// Surface gravity of the reference body in m/s².
pub const REFERENCE_GRAVITY: f64 = 9.81;

/// Altitude in metres above which the reference body has no atmosphere.
pub const REFERENCE_ATMOSPHERE_HEIGHT: f64 = 70_000.0;

/// Mean radius of the reference body in metres.
pub const REFERENCE_RADIUS: f64 = 600_000.0;

/// Low circular orbit velocity in m/s.
pub const REFERENCE_ORBITAL_VELOCITY: f64 = 2_200.0;

/// Gravity and drag losses during ascent in m/s.
pub const REFERENCE_ASCENT_LOSSES: f64 = 1_500.0;

/// Altitude credited for just reaching orbit, in metres.
pub const REFERENCE_LOW_ORBIT_ALTITUDE: f64 = 80_000.0;

/// Metres of apoapsis gained per m/s of delta-v beyond orbital requirements.
pub const EXCESS_DELTA_V_ALTITUDE_FACTOR: f64 = 100.0;

/// Newtons per kilonewton; catalog thrust figures are kN.
pub const NEWTONS_PER_KILONEWTON: f64 = 1_000.0;
