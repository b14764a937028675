mod compare;
mod presigned;
