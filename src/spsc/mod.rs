mod ring;

pub use ring::{ring_buffer, Consumer, Monitor, Producer, QueueEmpty, QueueFull};
