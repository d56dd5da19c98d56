//! Route Handlers

pub mod footprint;
pub mod manual;
pub mod upload;

/// Tips shown alongside uploaded-table predictions
pub const UPLOAD_SUGGESTIONS: [&str; 4] = [
    "Optimize HVAC systems: proper maintenance and settings can reduce energy consumption.",
    "Switch to LED lights: LED lighting is more energy-efficient than conventional bulbs.",
    "Use energy-efficient appliances: choose appliances with a good energy rating.",
    "Consider renewable energy sources: solar and wind energy are great alternatives to fossil fuels.",
];

/// Tips shown alongside a manual prediction
pub const MANUAL_SUGGESTIONS: [&str; 3] = [
    "Use natural ventilation when possible.",
    "Schedule regular maintenance of HVAC systems.",
    "Monitor and optimize appliance usage.",
];
