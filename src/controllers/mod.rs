pub mod auth_controller;
pub mod pelicula_controller;
pub mod proyeccion_controller;
pub mod resena_controller;
pub mod sala_controller;
pub mod upload_controller;
