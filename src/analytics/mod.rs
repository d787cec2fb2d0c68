mod insights;

pub use insights::render_report;
