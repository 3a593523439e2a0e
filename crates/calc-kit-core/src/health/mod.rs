pub mod cholesterol;
