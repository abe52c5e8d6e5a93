mod nested;
mod shape;
