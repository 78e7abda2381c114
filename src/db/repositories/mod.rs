mod observations;
mod observers;
