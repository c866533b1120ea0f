use crate::DeviceSet;

/// Host-side data feed, polled from every long busy-wait of the bus engine.
///
/// Implementations must return quickly: the engine is measuring line timing around the call.
pub trait Ingest {
    fn poll(&mut self, devices: &mut DeviceSet);
}

impl<F> Ingest for F
where
    F: FnMut(&mut DeviceSet),
{
    fn poll(&mut self, devices: &mut DeviceSet) {
        self(devices)
    }
}

/// Ingest that never delivers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIngest;

impl Ingest for NoIngest {
    fn poll(&mut self, _devices: &mut DeviceSet) {}
}
