
mod pool;
