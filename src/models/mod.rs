pub mod pelicula;
pub mod proyeccion;
pub mod resena;
pub mod sala;
