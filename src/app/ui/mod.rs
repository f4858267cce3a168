mod details;
mod panels;
mod report;
