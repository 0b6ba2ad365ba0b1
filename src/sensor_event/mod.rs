pub mod sensor_reading;
