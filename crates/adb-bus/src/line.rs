use adb_time::TickTimer;

/// The shared open-drain data line.
///
/// The device only ever pulls the line low or lets it float; it never drives it high.
pub trait BusLine {
    /// Whether anyone (this device, the host or another device) is holding the line low.
    fn is_asserted(&mut self) -> bool;

    /// Starts pulling the line low.
    fn assert_line(&mut self);

    /// Stops pulling the line low.
    fn release(&mut self);
}

/// Everything the engine needs from the hardware: the line plus the tick counter.
pub trait BusPort: BusLine + TickTimer {}

impl<T: BusLine + TickTimer + ?Sized> BusPort for T {}
