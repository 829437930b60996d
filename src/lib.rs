//! certsort - sort certificates and diplomas into year/name folders.
//!
//! Reads each PDF or image in a folder, recovers the recipient's name and
//! the issuance year from its text (embedded PDF text, or OCR for scans and
//! photos), and copies the file to `<dest>/<year>/<name>/`.

pub mod cli;
pub mod config;
pub mod models;
pub mod ocr;
pub mod organizer;
pub mod progress;
pub mod services;
pub mod storage;
