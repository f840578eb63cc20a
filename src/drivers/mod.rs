pub mod gamepad_plus;
