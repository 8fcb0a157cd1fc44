// tests/unit/mod.rs
//! Executor behavior with a scripted transport: no sockets, exact send counts.


#[cfg(test)]
mod cancellation;

#[cfg(test)]
mod classification;
